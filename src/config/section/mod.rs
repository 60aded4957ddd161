//! Configuration section definitions.
//!
//! | Section      | Struct           | Purpose                                  |
//! |--------------|------------------|------------------------------------------|
//! | `[renderer]` | `RendererConfig` | External renderer command and limits     |
//! | `[pipeline]` | `PipelineConfig` | Debounce window                          |
//! | `[render]`   | `RenderSettings` | Settings that change the rendered output |
//! | `[preview]`  | `PreviewConfig`  | Pane mode, output and log destinations   |

mod pipeline;
mod preview;
mod render;
mod renderer;

pub use pipeline::PipelineConfig;
pub use preview::PreviewConfig;
pub use render::RenderSettings;
pub use renderer::{InputMode, RendererConfig};
