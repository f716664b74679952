use crate::relay::RelayError;
use log::error;

/// Request stage an error is reported for, decides the message prefix
#[derive(Debug, Clone, Copy, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorStage {
    Upload,
    Result,
}

impl ErrorStage {
    fn prefix(&self) -> &'static str {
        match self {
            ErrorStage::Upload => "Error",
            ErrorStage::Result => "Failed to fetch the generated image",
        }
    }

    /// Log the failure once and produce the text shown to the browser
    pub fn describe(&self, err: &RelayError) -> String {
        match err.remote_status() {
            Some(status) => error!(
                "{} failed: kind={} remote_status={} err={}",
                self,
                err.kind(),
                status,
                err
            ),
            None => error!("{} failed: kind={} err={}", self, err.kind(), err),
        }
        format!("{}: {}", self.prefix(), err)
    }
}
