use core::fmt::Display;

/// Holds the context for the current collection backup. Used for prefixing logs.
#[derive(Default, Debug)]
pub struct Context {
    /// The collection being backed up.
    pub collection: String,
    /// The snapshot once it has been created.
    pub snapshot: Option<String>,
    /// The current step.
    pub current_context: &'static str,
}

impl Context {
    /// Create a context for backing up a collection.
    pub fn new(collection: &str) -> Self {
        Self {
            collection: collection.to_string(),
            snapshot: None,
            current_context: "Start",
        }
    }
}

impl Display for Context {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.snapshot {
            Some(snapshot) => write!(f, "[{}/{snapshot}] ", self.collection)?,
            None => write!(f, "[{}] ", self.collection)?,
        }

        write!(f, "[{}] ", self.current_context)?;

        Ok(())
    }
}
