pub mod chat;
pub mod executor;
pub mod metrics;
pub mod ocr;
pub mod payload;
pub mod table_formatter;

pub use chat::{ChatProvider, GroqChatProvider, MockChatProvider};
pub use self::metrics::{get_metrics, init_metrics};
pub use ocr::{MockOcrBackend, OcrBackend, OcrRelay, OcrSpaceBackend, TesseractBackend};
pub use table_formatter::{FormatError, TableFormatter};
