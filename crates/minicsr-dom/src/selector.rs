//! Simple selectors for root lookup.
//!
//! Supports a single compound selector: an optional tag name followed by any
//! number of `#id`, `.class`, `[attr]` and `[attr=value]` parts, e.g.
//! `#app`, `div.card`, `section[data-for=todos]`. Combinators are not
//! supported.

use nom::{
	IResult, Parser,
	branch::alt,
	bytes::complete::{take_while, take_while1},
	character::complete::char,
	combinator::{all_consuming, map, opt},
	multi::many0,
	sequence::{delimited, pair, preceded},
};

use crate::node::DomNode;

/// Selector parse failure.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
	/// The selector was empty or only whitespace.
	#[error("Selector is empty")]
	Empty,

	/// The selector uses syntax outside the supported subset.
	#[error("Unsupported selector: '{0}'")]
	Unsupported(String),
}

/// A parsed compound selector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
	tag: Option<String>,
	id: Option<String>,
	classes: Vec<String>,
	attributes: Vec<(String, Option<String>)>,
}

enum Part {
	Id(String),
	Class(String),
	Attribute(String, Option<String>),
}

fn identifier(input: &str) -> IResult<&str, &str> {
	take_while1(|c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '_')).parse(input)
}

fn attribute_name(input: &str) -> IResult<&str, &str> {
	take_while1(|c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':')).parse(input)
}

fn attribute_value(input: &str) -> IResult<&str, &str> {
	alt((
		delimited(char('"'), take_while(|c| c != '"'), char('"')),
		delimited(char('\''), take_while(|c| c != '\''), char('\'')),
		take_while1(|c| c != ']'),
	))
	.parse(input)
}

fn part(input: &str) -> IResult<&str, Part> {
	alt((
		map(preceded(char('#'), identifier), |id| Part::Id(id.to_string())),
		map(preceded(char('.'), identifier), |class| {
			Part::Class(class.to_string())
		}),
		map(
			delimited(
				char('['),
				pair(attribute_name, opt(preceded(char('='), attribute_value))),
				char(']'),
			),
			|(name, value)| Part::Attribute(name.to_string(), value.map(str::to_string)),
		),
	))
	.parse(input)
}

fn compound(input: &str) -> IResult<&str, (Option<&str>, Vec<Part>)> {
	all_consuming(pair(opt(identifier), many0(part))).parse(input)
}

impl Selector {
	/// Parses a selector string.
	pub fn parse(selector: &str) -> Result<Self, SelectorError> {
		let trimmed = selector.trim();
		if trimmed.is_empty() {
			return Err(SelectorError::Empty);
		}
		let (_, (tag, parts)) =
			compound(trimmed).map_err(|_| SelectorError::Unsupported(trimmed.to_string()))?;

		let mut parsed = Self {
			tag: tag.map(str::to_ascii_lowercase),
			..Self::default()
		};
		for part in parts {
			match part {
				Part::Id(id) => parsed.id = Some(id),
				Part::Class(class) => parsed.classes.push(class),
				Part::Attribute(name, value) => parsed.attributes.push((name, value)),
			}
		}
		Ok(parsed)
	}

	/// Returns true if `node` satisfies every part of the selector.
	pub fn matches<N: DomNode>(&self, node: &N) -> bool {
		if self.tag.as_ref().is_some_and(|tag| node.tag_name() != *tag) {
			return false;
		}
		if self
			.id
			.as_ref()
			.is_some_and(|id| node.attribute("id").as_deref() != Some(id.as_str()))
		{
			return false;
		}
		if !self.classes.iter().all(|class| node.has_class(class)) {
			return false;
		}
		self.attributes.iter().all(|(name, value)| match value {
			Some(expected) => node.attribute(name).as_deref() == Some(expected.as_str()),
			None => node.has_attribute(name),
		})
	}
}

impl std::str::FromStr for Selector {
	type Err = SelectorError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::memory::MemoryNode;
	use rstest::rstest;

	#[rstest]
	#[case("#app", true)]
	#[case("div", true)]
	#[case("div#app", true)]
	#[case(".card", true)]
	#[case("div.card.wide", true)]
	#[case("[data-for]", true)]
	#[case("[data-for=todos]", true)]
	#[case("[data-for=\"todos\"]", true)]
	#[case("span", false)]
	#[case("#other", false)]
	#[case(".missing", false)]
	#[case("[data-for=items]", false)]
	fn test_selector_matching(#[case] selector: &str, #[case] expected: bool) {
		let node = MemoryNode::element("div");
		node.set_attribute("id", "app");
		node.set_attribute("class", "card wide");
		node.set_attribute("data-for", "todos");

		let selector = Selector::parse(selector).unwrap();
		assert_eq!(selector.matches(&node), expected);
	}

	#[rstest]
	#[case("", SelectorError::Empty)]
	#[case("   ", SelectorError::Empty)]
	#[case("div > p", SelectorError::Unsupported("div > p".into()))]
	#[case("#", SelectorError::Unsupported("#".into()))]
	fn test_selector_errors(#[case] selector: &str, #[case] expected: SelectorError) {
		assert_eq!(Selector::parse(selector), Err(expected));
	}
}
