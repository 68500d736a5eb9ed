pub mod frame;
pub mod reading;
pub mod relay;
pub mod submit;

pub use frame::{decode_image_data, encode_jpeg, FrameRequest, FrameRequestError, ValidFrame};
pub use reading::{DetectionFailure, FrameReading};
pub use relay::{DetectorSettings, FrameRelay};
pub use submit::{FrameSubmitter, HttpSubmitter, LocalSubmitter};
