//! IO side of quackdoc: probing inputs, running the conversion tool, cleaning and
//! validating its output, and orchestrating single and batch conversions.
mod backend;
mod converter;
mod decode;
mod executor;
mod pandoc;
mod persist;
mod postprocess;
mod probe;
mod report;
mod retry;
mod types;
mod validate;

pub use backend::{ExternalConverter, Html2MdBackend, ToolRequest};
pub use converter::{ConverterContext, DocumentConverter};
pub use decode::{decode_text, DecodeError, DecodedText};
pub use executor::{ConversionExecutor, RawOutput};
pub use pandoc::PandocBackend;
pub use persist::{
    ensure_output_dir, AtomicFileWriter, DirectoryCreator, FileInfoProvider, FileStat, LocalFs,
    PersistError, TextWriter,
};
pub use postprocess::clean_markdown;
pub use probe::{probe, FileProbe};
pub use report::{write_batch_report, ReportError};
pub use retry::{run_with_retry, Exhausted};
pub use types::{ChannelProgressSink, ConversionEvent, ConvertError, NullProgressSink, ProgressSink};
pub use validate::{OutputValidator, ValidationReport};
