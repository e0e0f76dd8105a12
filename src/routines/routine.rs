/// What a routine reports when it fails as a whole (row-level failures are
/// contained inside the routine and do not show up here).
#[derive(Debug)]
pub struct RoutineFailureInfo {
    pub message: String,
}

impl RoutineFailureInfo {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for RoutineFailureInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

pub type RoutineResult = Result<(), RoutineFailureInfo>;

#[async_trait::async_trait]
pub trait Routine: Send + Sync {
    fn name(&self) -> &str;
    async fn run(&self) -> RoutineResult;
}
