//! Markup parsing and serialization for the in-memory tree.
//!
//! This is a small, forgiving subset of HTML: elements, quoted/unquoted/bare
//! attributes, text with the five basic entities, comments, a doctype, and the
//! usual void elements. Attribute names may contain `:` so markers like
//! `data-on:click` parse as written.
//!
//! Token-level parsing uses nom combinators; nesting is driven by a recursive
//! descent over those tokens so structural errors carry a byte offset.

use nom::{
	IResult, Parser,
	branch::alt,
	bytes::complete::{tag, take_until, take_while, take_while1},
	character::complete::{char, multispace0, multispace1},
	combinator::{map, opt},
	multi::many0,
	sequence::{delimited, preceded},
};

use crate::memory::MemoryNode;
use crate::node::DomNode;

/// Elements that never have children or a closing tag.
pub const VOID_ELEMENTS: &[&str] = &[
	"area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
	"wbr",
];

/// Returns true for elements serialized without a closing tag.
pub fn is_void_element(tag: &str) -> bool {
	VOID_ELEMENTS.contains(&tag)
}

/// Markup parse failure.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MarkupError {
	/// Input that is not a tag, comment or text.
	#[error("Unexpected input at offset {offset}")]
	UnexpectedInput {
		/// Byte offset into the markup.
		offset: usize,
	},

	/// An element reached end of input without its closing tag.
	#[error("Element <{tag}> opened at offset {offset} is never closed")]
	Unclosed {
		/// The element's tag name.
		tag: String,
		/// Byte offset of the opening tag.
		offset: usize,
	},

	/// A closing tag that does not match the innermost open element.
	#[error("Closing tag </{found}> at offset {offset} does not match <{expected}>")]
	MismatchedClosingTag {
		/// Tag name of the innermost open element.
		expected: String,
		/// Tag name found in the closing tag.
		found: String,
		/// Byte offset of the closing tag.
		offset: usize,
	},

	/// A closing tag with no open element.
	#[error("Unexpected closing tag </{found}> at offset {offset}")]
	UnexpectedClosingTag {
		/// Tag name found in the closing tag.
		found: String,
		/// Byte offset of the closing tag.
		offset: usize,
	},

	/// A `<!--` without a matching `-->`.
	#[error("Comment at offset {offset} is never terminated")]
	UnterminatedComment {
		/// Byte offset of the comment start.
		offset: usize,
	},
}

// ============================================================================
// Token parsers
// ============================================================================

struct OpenTag {
	name: String,
	attributes: Vec<(String, String)>,
	self_closing: bool,
}

fn tag_name(input: &str) -> IResult<&str, &str> {
	take_while1(|c: char| c.is_ascii_alphanumeric() || c == '-').parse(input)
}

fn attribute_name(input: &str) -> IResult<&str, &str> {
	take_while1(|c: char| {
		!c.is_whitespace() && !matches!(c, '=' | '>' | '/' | '"' | '\'' | '<')
	})
	.parse(input)
}

fn attribute_value(input: &str) -> IResult<&str, &str> {
	alt((
		delimited(char('"'), take_while(|c| c != '"'), char('"')),
		delimited(char('\''), take_while(|c| c != '\''), char('\'')),
		take_while1(|c: char| !c.is_whitespace() && !matches!(c, '>' | '"' | '\'')),
	))
	.parse(input)
}

fn attribute(input: &str) -> IResult<&str, (String, String)> {
	map(
		(
			attribute_name,
			opt(preceded((multispace0, char('='), multispace0), attribute_value)),
		),
		|(name, value)| {
			(
				name.to_ascii_lowercase(),
				value.map(decode_entities).unwrap_or_default(),
			)
		},
	)
	.parse(input)
}

fn open_tag(input: &str) -> IResult<&str, OpenTag> {
	map(
		(
			preceded(char('<'), tag_name),
			many0(preceded(multispace1, attribute)),
			multispace0,
			alt((tag("/>"), tag(">"))),
		),
		|(name, attributes, _, end)| OpenTag {
			name: name.to_ascii_lowercase(),
			attributes,
			self_closing: end == "/>",
		},
	)
	.parse(input)
}

fn close_tag(input: &str) -> IResult<&str, String> {
	map(
		delimited(tag("</"), tag_name, (multispace0, char('>'))),
		str::to_ascii_lowercase,
	)
	.parse(input)
}

fn comment(input: &str) -> IResult<&str, &str> {
	delimited(tag("<!--"), take_until("-->"), tag("-->")).parse(input)
}

fn declaration(input: &str) -> IResult<&str, &str> {
	delimited(tag("<!"), take_while(|c| c != '>'), char('>')).parse(input)
}

fn text(input: &str) -> IResult<&str, &str> {
	take_while1(|c| c != '<').parse(input)
}

// ============================================================================
// Tree construction
// ============================================================================

/// Parses markup into a list of detached top-level nodes.
///
/// # Example
///
/// ```
/// use minicsr_dom::{DomNode, parse_fragment};
///
/// let nodes = parse_fragment(r#"<ul data-for="todos"><li data-bind="name"></li></ul>"#).unwrap();
/// assert_eq!(nodes.len(), 1);
/// assert_eq!(nodes[0].attribute("data-for").as_deref(), Some("todos"));
/// ```
pub fn parse_fragment(markup: &str) -> Result<Vec<MemoryNode>, MarkupError> {
	let (_, nodes) = parse_nodes(markup, markup, None)?;
	Ok(nodes)
}

fn offset_of(source: &str, rest: &str) -> usize {
	source.len() - rest.len()
}

/// Parses sibling nodes until end of input or the closing tag of `open`.
fn parse_nodes<'a>(
	source: &'a str,
	mut input: &'a str,
	open: Option<(&str, usize)>,
) -> Result<(&'a str, Vec<MemoryNode>), MarkupError> {
	let mut nodes = Vec::new();
	loop {
		if input.is_empty() {
			return match open {
				Some((tag, offset)) => Err(MarkupError::Unclosed {
					tag: tag.to_string(),
					offset,
				}),
				None => Ok((input, nodes)),
			};
		}

		let offset = offset_of(source, input);

		if input.starts_with("</") {
			let (rest, found) =
				close_tag(input).map_err(|_| MarkupError::UnexpectedInput { offset })?;
			return match open {
				Some((expected, _)) if expected == found => Ok((rest, nodes)),
				Some((expected, _)) => Err(MarkupError::MismatchedClosingTag {
					expected: expected.to_string(),
					found,
					offset,
				}),
				None => Err(MarkupError::UnexpectedClosingTag { found, offset }),
			};
		}

		if input.starts_with("<!--") {
			let (rest, _) =
				comment(input).map_err(|_| MarkupError::UnterminatedComment { offset })?;
			input = rest;
			continue;
		}

		if input.starts_with("<!") {
			let (rest, _) =
				declaration(input).map_err(|_| MarkupError::UnexpectedInput { offset })?;
			input = rest;
			continue;
		}

		if input.starts_with('<') {
			let (rest, open_tag) =
				open_tag(input).map_err(|_| MarkupError::UnexpectedInput { offset })?;
			let element = MemoryNode::element(&open_tag.name);
			for (name, value) in &open_tag.attributes {
				element.set_attribute(name, value);
			}
			input = rest;
			if !open_tag.self_closing && !is_void_element(&open_tag.name) {
				let (rest, children) =
					parse_nodes(source, input, Some((open_tag.name.as_str(), offset)))?;
				for child in &children {
					element.append_node(child);
				}
				input = rest;
			}
			nodes.push(element);
			continue;
		}

		let (rest, raw) = text(input).map_err(|_| MarkupError::UnexpectedInput { offset })?;
		nodes.push(MemoryNode::text(&decode_entities(raw)));
		input = rest;
	}
}

// ============================================================================
// Entities
// ============================================================================

/// Decodes `&amp;`, `&lt;`, `&gt;`, `&quot;` and `&#39;`.
pub fn decode_entities(raw: &str) -> String {
	if !raw.contains('&') {
		return raw.to_string();
	}
	raw.replace("&lt;", "<")
		.replace("&gt;", ">")
		.replace("&quot;", "\"")
		.replace("&#39;", "'")
		.replace("&amp;", "&")
}

/// Escapes text content for serialization.
pub fn escape_text(text: &str) -> String {
	text.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
}

/// Escapes an attribute value for serialization inside double quotes.
pub fn escape_attribute(value: &str) -> String {
	value.replace('&', "&amp;").replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_parse_nested_elements_and_text() {
		let nodes = parse_fragment("<div id=\"app\"><p>Hello <b>world</b></p></div>").unwrap();

		assert_eq!(nodes.len(), 1);
		let app = &nodes[0];
		assert_eq!(app.tag_name(), "div");
		assert_eq!(app.attribute("id").as_deref(), Some("app"));
		assert_eq!(app.text_content(), "Hello world");
		assert_eq!(app.descendants().len(), 2);
	}

	#[rstest]
	fn test_parse_marker_attributes() {
		let nodes = parse_fragment(
			"<button data-on:click=\"addTodo\" data-bind:title='tip' disabled>Add</button>",
		)
		.unwrap();

		let button = &nodes[0];
		assert_eq!(
			button.attributes(),
			vec![
				("data-on:click".to_string(), "addTodo".to_string()),
				("data-bind:title".to_string(), "tip".to_string()),
				("disabled".to_string(), String::new()),
			]
		);
	}

	#[rstest]
	fn test_parse_void_and_self_closing() {
		let nodes = parse_fragment("<input data-model=\"q\"><br/><span />tail").unwrap();

		assert_eq!(nodes.len(), 4);
		assert_eq!(nodes[0].tag_name(), "input");
		assert_eq!(nodes[1].tag_name(), "br");
		assert_eq!(nodes[2].tag_name(), "span");
		assert!(nodes[2].children().is_empty());
	}

	#[rstest]
	fn test_parse_skips_comments_and_doctype() {
		let nodes = parse_fragment("<!DOCTYPE html><!-- note --><p>x</p>").unwrap();
		assert_eq!(nodes.len(), 1);
		assert_eq!(nodes[0].tag_name(), "p");
	}

	#[rstest]
	fn test_parse_decodes_entities() {
		let nodes = parse_fragment("<p title=\"a &amp; b\">1 &lt; 2</p>").unwrap();
		assert_eq!(nodes[0].attribute("title").as_deref(), Some("a & b"));
		assert_eq!(nodes[0].text_content(), "1 < 2");
	}

	#[rstest]
	#[case("<div><p></div>", MarkupError::MismatchedClosingTag { expected: "p".into(), found: "div".into(), offset: 8 })]
	#[case("<div>", MarkupError::Unclosed { tag: "div".into(), offset: 0 })]
	#[case("</p>", MarkupError::UnexpectedClosingTag { found: "p".into(), offset: 0 })]
	#[case("<!-- open", MarkupError::UnterminatedComment { offset: 0 })]
	#[case("<>", MarkupError::UnexpectedInput { offset: 0 })]
	fn test_parse_errors(#[case] markup: &str, #[case] expected: MarkupError) {
		assert_eq!(parse_fragment(markup).unwrap_err(), expected);
	}
}
