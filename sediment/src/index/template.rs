use smallvec::SmallVec;
use std::sync::Arc;

use crate::collection::Document;
use crate::common::{Value, FIELD_MARKER, LITERAL_MARKER};
use crate::errors::{ErrorKind, SedimentError, SedimentResult};

type ArgVec = SmallVec<[String; 4]>;

/// A parameterized index-key template.
///
/// The pattern contains placeholder markers that are substituted left to
/// right against a positional argument list:
///
/// * `#` - the next argument is substituted verbatim
/// * `$` - the next argument is looked up as a field name on the document
///   being indexed, and the field's key-part rendering is substituted
///
/// Both marker kinds consume from the same positional counter: the Nth
/// placeholder always takes the Nth argument, whatever its kind. The argument
/// count is validated against the placeholder count at construction time, so
/// a miscounted template fails at registration rather than at write time.
///
/// # Examples
///
/// ```rust,ignore
/// use sediment::index::KeyTemplate;
///
/// // resolves to "users:email:<doc.email>"
/// let template = KeyTemplate::new("users:#:$", vec!["email", "email"])?;
///
/// // a literal key with no placeholders
/// let order = KeyTemplate::new("users:created", vec![])?;
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyTemplate {
    inner: Arc<KeyTemplateInner>,
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct KeyTemplateInner {
    pattern: String,
    args: ArgVec,
}

impl KeyTemplate {
    /// Creates a new key template.
    ///
    /// # Arguments
    /// * `pattern` - The key pattern, containing zero or more `#`/`$` markers
    /// * `args` - The positional substitution arguments, one per marker
    ///
    /// # Errors
    /// `TemplateError` if the argument count does not match the placeholder
    /// count.
    pub fn new<S: Into<String>>(pattern: &str, args: Vec<S>) -> SedimentResult<Self> {
        let args: ArgVec = args.into_iter().map(|a| a.into()).collect();
        let placeholders = count_placeholders(pattern);
        if placeholders != args.len() {
            log::error!(
                "Template '{}' has {} placeholder(s) but {} argument(s)",
                pattern,
                placeholders,
                args.len()
            );
            return Err(SedimentError::new(
                &format!(
                    "template '{}' expects {} argument(s), got {}",
                    pattern,
                    placeholders,
                    args.len()
                ),
                ErrorKind::TemplateError,
            ));
        }

        Ok(KeyTemplate {
            inner: Arc::new(KeyTemplateInner {
                pattern: pattern.to_string(),
                args,
            }),
        })
    }

    /// Creates a template with no placeholders.
    pub fn literal(pattern: &str) -> SedimentResult<Self> {
        KeyTemplate::new(pattern, Vec::<String>::new())
    }

    /// Returns the raw pattern string.
    pub fn pattern(&self) -> &str {
        &self.inner.pattern
    }

    /// Returns the positional arguments.
    pub fn args(&self) -> &[String] {
        &self.inner.args
    }

    /// Returns the number of placeholders in the pattern.
    pub fn placeholder_count(&self) -> usize {
        count_placeholders(&self.inner.pattern)
    }

    /// Resolves the template against a document.
    ///
    /// Field-lookup (`$`) arguments are resolved via [`Document::get`].
    ///
    /// # Errors
    /// `TemplateError` if a `$` argument names a field the document has no
    /// key-part value for. This indicates a caller contract violation (an
    /// indexed field missing from the document), not a recoverable condition.
    pub fn resolve(&self, doc: &Document) -> SedimentResult<String> {
        self.resolve_with(|field| doc.get(field))
    }

    /// Resolves the template using an arbitrary field lookup.
    ///
    /// Derived accessors use this to resolve the same template against a
    /// single probe value instead of a full document.
    pub fn resolve_with<F>(&self, lookup: F) -> SedimentResult<String>
    where
        F: Fn(&str) -> Option<Value>,
    {
        let mut resolved = String::with_capacity(self.inner.pattern.len());
        let mut next_arg = 0usize;

        for ch in self.inner.pattern.chars() {
            if ch != LITERAL_MARKER && ch != FIELD_MARKER {
                resolved.push(ch);
                continue;
            }

            // shared positional counter across both marker kinds
            let arg = self.inner.args.get(next_arg).ok_or_else(|| {
                SedimentError::new(
                    &format!("template '{}' ran out of arguments", self.inner.pattern),
                    ErrorKind::TemplateError,
                )
            })?;
            next_arg += 1;

            if ch == LITERAL_MARKER {
                resolved.push_str(arg);
            } else {
                let part = lookup(arg).and_then(|v| v.as_key_part()).ok_or_else(|| {
                    log::error!(
                        "Field '{}' has no key-part value while resolving template '{}'",
                        arg,
                        self.inner.pattern
                    );
                    SedimentError::new(
                        &format!(
                            "field '{}' has no value to substitute into template '{}'",
                            arg, self.inner.pattern
                        ),
                        ErrorKind::TemplateError,
                    )
                })?;
                resolved.push_str(&part);
            }
        }

        Ok(resolved)
    }
}

fn count_placeholders(pattern: &str) -> usize {
    pattern
        .chars()
        .filter(|&c| c == LITERAL_MARKER || c == FIELD_MARKER)
        .count()
}
