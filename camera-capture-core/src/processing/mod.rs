pub mod frame_extractor;
