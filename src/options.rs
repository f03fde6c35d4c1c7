//! Parser configuration.
use crate::Scalar;
use regex::Regex;
use std::sync::Arc;

/// Post-processes element text: `(tag_name, value, jpath, has_attributes, is_leaf)`.
///
/// Returning `None` keeps the raw text and skips type coercion.
/// Returning the input unchanged (as `Scalar::Text`) lets coercion run as usual.
/// Any other value replaces the text.
pub type TagValueProcessor =
    Arc<dyn Fn(&str, &str, &str, bool, bool) -> Option<Scalar> + Send + Sync>;

/// Post-processes attribute values: `(attribute_name, value, jpath)`.
///
/// Same contract as [`TagValueProcessor`].
pub type AttributeValueProcessor = Arc<dyn Fn(&str, &str, &str) -> Option<Scalar> + Send + Sync>;

/// Policy for turning numeric-looking strings into numbers.
#[derive(Debug, Clone)]
pub struct NumberOptions {
    /// Accept `0x` prefixed hexadecimal integers (default: true)
    pub hex: bool,

    /// Accept literals with leading zeros such as `007` (default: true)
    pub leading_zeros: bool,

    /// Accept exponent notation such as `1e5` (default: true)
    pub e_notation: bool,

    /// Values matching this pattern are never converted (default: none)
    pub skip_like: Option<Regex>,
}
impl Default for NumberOptions {
    fn default() -> Self {
        Self {
            hex: true,
            leading_zeros: true,
            e_notation: true,
            skip_like: None,
        }
    }
}

/// Options controlling how a document is turned into a tree.
///
/// ```rust
/// use tagtree::ParserOptions;
///
/// let options = ParserOptions::new()
///     .ignore_attributes(false)
///     .attribute_name_prefix("")
///     .stop_nodes(["html.body.script"]);
/// assert!(!options.ignore_attributes);
/// ```
#[derive(Clone)]
pub struct ParserOptions {
    /// Skip attribute extraction entirely (default: true)
    pub ignore_attributes: bool,

    /// Keep valueless attributes as boolean `true` (default: false)
    pub allow_boolean_attributes: bool,

    /// Prepended to every attribute name in the emitted map (default: "@_")
    pub attribute_name_prefix: String,

    /// Nest the attributes of a tag under this key (default: none)
    pub attributes_group_name: Option<String>,

    /// Strip `prefix:` from tag and attribute names, dropping `xmlns` attributes (default: false)
    pub remove_ns_prefix: bool,

    /// Trim whitespace from text and attribute values (default: true)
    pub trim_values: bool,

    /// Resolve DTD-declared and built-in entities (default: true)
    pub process_entities: bool,

    /// Also resolve the HTML entity set (default: false)
    pub html_entities: bool,

    /// Key for CDATA content; when unset CDATA merges into the text (default: none)
    pub cdata_prop_name: Option<String>,

    /// Key for comments; when unset comments are discarded (default: none)
    pub comment_prop_name: Option<String>,

    /// Tags that never have a closing tag, like `<br>` (default: empty)
    pub unpaired_tags: Vec<String>,

    /// Dot-joined paths whose content is kept as raw text (default: empty)
    pub stop_nodes: Vec<String>,

    /// Text post-processing hook (default: identity)
    pub tag_value_processor: TagValueProcessor,

    /// Attribute post-processing hook (default: identity)
    pub attribute_value_processor: AttributeValueProcessor,

    /// Coerce element text into booleans and numbers (default: true)
    pub parse_tag_value: bool,

    /// Coerce attribute values into booleans and numbers (default: false)
    pub parse_attribute_value: bool,

    /// Numeric coercion policy
    pub number_parse_options: NumberOptions,

    /// Key used for text children (default: "#text")
    pub text_node_name: String,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            ignore_attributes: true,
            allow_boolean_attributes: false,
            attribute_name_prefix: "@_".to_string(),
            attributes_group_name: None,
            remove_ns_prefix: false,
            trim_values: true,
            process_entities: true,
            html_entities: false,
            cdata_prop_name: None,
            comment_prop_name: None,
            unpaired_tags: Vec::new(),
            stop_nodes: Vec::new(),
            tag_value_processor: Arc::new(|_, value, _, _, _| {
                Some(Scalar::Text(value.to_string()))
            }),
            attribute_value_processor: Arc::new(|_, value, _| {
                Some(Scalar::Text(value.to_string()))
            }),
            parse_tag_value: true,
            parse_attribute_value: false,
            number_parse_options: NumberOptions::default(),
            text_node_name: "#text".to_string(),
        }
    }
}

impl ParserOptions {
    /// Create new default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable attribute extraction.
    #[must_use]
    pub fn ignore_attributes(mut self, ignore: bool) -> Self {
        self.ignore_attributes = ignore;
        self
    }

    /// Keep valueless attributes as `true`.
    #[must_use]
    pub fn allow_boolean_attributes(mut self, allow: bool) -> Self {
        self.allow_boolean_attributes = allow;
        self
    }

    /// Set the prefix for attribute keys.
    #[must_use]
    pub fn attribute_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.attribute_name_prefix = prefix.into();
        self
    }

    /// Group attributes under a single key.
    #[must_use]
    pub fn attributes_group_name(mut self, name: impl Into<String>) -> Self {
        self.attributes_group_name = Some(name.into());
        self
    }

    /// Strip namespace prefixes.
    #[must_use]
    pub fn remove_ns_prefix(mut self, remove: bool) -> Self {
        self.remove_ns_prefix = remove;
        self
    }

    /// Trim text and attribute values.
    #[must_use]
    pub fn trim_values(mut self, trim: bool) -> Self {
        self.trim_values = trim;
        self
    }

    /// Resolve entities in text and attribute values.
    #[must_use]
    pub fn process_entities(mut self, process: bool) -> Self {
        self.process_entities = process;
        self
    }

    /// Resolve HTML entities on top of the XML ones.
    #[must_use]
    pub fn html_entities(mut self, enabled: bool) -> Self {
        self.html_entities = enabled;
        self
    }

    /// Store CDATA sections under their own key.
    #[must_use]
    pub fn cdata_prop_name(mut self, name: impl Into<String>) -> Self {
        self.cdata_prop_name = Some(name.into());
        self
    }

    /// Keep comments under the given key.
    #[must_use]
    pub fn comment_prop_name(mut self, name: impl Into<String>) -> Self {
        self.comment_prop_name = Some(name.into());
        self
    }

    /// Set the tags treated as always self-closing.
    #[must_use]
    pub fn unpaired_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unpaired_tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set the paths captured verbatim.
    #[must_use]
    pub fn stop_nodes<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_nodes = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the text post-processing hook.
    #[must_use]
    pub fn tag_value_processor<F>(mut self, processor: F) -> Self
    where
        F: Fn(&str, &str, &str, bool, bool) -> Option<Scalar> + Send + Sync + 'static,
    {
        self.tag_value_processor = Arc::new(processor);
        self
    }

    /// Replace the attribute post-processing hook.
    #[must_use]
    pub fn attribute_value_processor<F>(mut self, processor: F) -> Self
    where
        F: Fn(&str, &str, &str) -> Option<Scalar> + Send + Sync + 'static,
    {
        self.attribute_value_processor = Arc::new(processor);
        self
    }

    /// Coerce element text.
    #[must_use]
    pub fn parse_tag_value(mut self, parse: bool) -> Self {
        self.parse_tag_value = parse;
        self
    }

    /// Coerce attribute values.
    #[must_use]
    pub fn parse_attribute_value(mut self, parse: bool) -> Self {
        self.parse_attribute_value = parse;
        self
    }

    /// Set the numeric coercion policy.
    #[must_use]
    pub fn number_parse_options(mut self, options: NumberOptions) -> Self {
        self.number_parse_options = options;
        self
    }

    /// Set the key used for text children.
    #[must_use]
    pub fn text_node_name(mut self, name: impl Into<String>) -> Self {
        self.text_node_name = name.into();
        self
    }

    pub(crate) fn is_unpaired(&self, tag_name: &str) -> bool {
        self.unpaired_tags.iter().any(|t| t == tag_name)
    }

    pub(crate) fn is_stop_node(&self, jpath: &str) -> bool {
        self.stop_nodes.iter().any(|p| p == jpath)
    }
}

impl std::fmt::Debug for ParserOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserOptions")
            .field("ignore_attributes", &self.ignore_attributes)
            .field("allow_boolean_attributes", &self.allow_boolean_attributes)
            .field("attribute_name_prefix", &self.attribute_name_prefix)
            .field("attributes_group_name", &self.attributes_group_name)
            .field("remove_ns_prefix", &self.remove_ns_prefix)
            .field("trim_values", &self.trim_values)
            .field("process_entities", &self.process_entities)
            .field("html_entities", &self.html_entities)
            .field("cdata_prop_name", &self.cdata_prop_name)
            .field("comment_prop_name", &self.comment_prop_name)
            .field("unpaired_tags", &self.unpaired_tags)
            .field("stop_nodes", &self.stop_nodes)
            .field("parse_tag_value", &self.parse_tag_value)
            .field("parse_attribute_value", &self.parse_attribute_value)
            .field("number_parse_options", &self.number_parse_options)
            .field("text_node_name", &self.text_node_name)
            .finish_non_exhaustive()
    }
}
