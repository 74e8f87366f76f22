//! Error types for computed property evaluation.

/// Failure raised by a computed definition.
///
/// A computed definition that returns one of these keeps the previously stored
/// value for its property; the failure is logged and the recalculation pass
/// continues with the next definition.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ComputeError {
	/// The property does not exist in the state object.
	#[error("Property '{0}' is not defined")]
	MissingProperty(String),

	/// The property exists but holds a different kind of value.
	#[error("Property '{property}' is not {expected}")]
	TypeMismatch {
		/// The property that was read.
		property: String,
		/// Human readable name of the kind that was expected.
		expected: &'static str,
	},

	/// Any other failure, described by a message.
	#[error("{0}")]
	Custom(String),
}

impl ComputeError {
	/// Creates a free-form computation error.
	pub fn custom(message: impl Into<String>) -> Self {
		Self::Custom(message.into())
	}

	pub(crate) fn type_mismatch(property: &str, expected: &'static str) -> Self {
		Self::TypeMismatch {
			property: property.to_string(),
			expected,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(ComputeError::MissingProperty("todos".into()), "Property 'todos' is not defined")]
	#[case(ComputeError::type_mismatch("todos", "an array"), "Property 'todos' is not an array")]
	#[case(ComputeError::custom("division by zero"), "division by zero")]
	fn test_compute_error_display(#[case] error: ComputeError, #[case] expected: &str) {
		assert_eq!(error.to_string(), expected);
	}
}
