/// Settings for the tracing-backed log integration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSettings {
    pub enabled: bool,
}
