pub mod face_state;
pub mod infrastructure;
pub mod mosaic_image_use_case;
pub mod mosaic_video_use_case;
pub mod pipeline_executor;
pub mod pipeline_logger;
