pub mod camera_delegate;
pub mod camera_device;
pub mod camera_hal;
pub mod capture_session;
pub mod frame_reader;
pub mod frame_sink;
pub mod render_target;
pub mod video_encoder;
