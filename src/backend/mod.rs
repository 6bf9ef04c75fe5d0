//! Backend abstraction layer
//!
//! Provides the [`GraphicsBackend`] trait that meshes and textures are built
//! through, an in-memory [`DummyBackend`] for tests, and an OpenGL backend
//! behind the `gl-backend` feature.

pub mod dummy;
pub mod traits;
pub mod types;

#[cfg(feature = "gl-backend")]
pub mod opengl;

pub use dummy::{DrawCall, DummyBackend, FailurePoint};
#[cfg(feature = "gl-backend")]
pub use opengl::OpenGlBackend;
pub use traits::*;
pub use types::*;
