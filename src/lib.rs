//! Build-time source generation from Simple Binary Encoding (SBE) schemas.
//!
//! This crate is a thin adapter around the external SBE code generator, in
//! the mold of `prost-build` around `protoc`: it feeds schema files to the
//! generator during a build, writes the generated sources (and, optionally,
//! serialized intermediate-representation cache files) into an output
//! directory, and registers that directory with Cargo. It performs no schema
//! parsing, IR construction, or code emission of its own.
//!
//! The main entry point is the [`Config`] builder:
//!
//! - `.xml` resources are compiled to the generator's intermediate
//!   representation and on to source stubs.
//! - `.sbeir` resources are pre-compiled IR caches, loaded without touching
//!   the schema compiler.
//! - Resources with any other extension are logged and skipped.
//!
//! # Usage from `build.rs`
//!
//! ```no_run
//! // build.rs
//! fn main() -> miette::Result<()> {
//!     let outcome = sbe_build::Config::new()
//!         .namespace("com.example.car")
//!         .resource("schemas/car.xml")
//!         .compile()?;
//!     outcome.emit_cargo_directives();
//!     Ok(())
//! }
//! ```
//!
//! The directives export the output directory as `SBE_GENERATED_DIR`, so the
//! consuming crate pulls the generated code in with:
//!
//! ```ignore
//! include!(concat!(env!("SBE_GENERATED_DIR"), "/car_codec.rs"));
//! ```
//!
//! # Locating the generator
//!
//! The external generator is found through the `SBE_TOOL` environment
//! variable (an executable), the `SBE_JAR` environment variable (the
//! `sbe-all` jar, run via `java`), or `sbe-tool` on `PATH`, in that order.
//! [`Config::tool`] overrides discovery entirely.
//!
//! # Error handling
//!
//! All fallible methods return [`miette::Result`]. The first generator,
//! decode, or I/O failure aborts the run; output already written stays on
//! disk. Every error names the resource being processed when it failed.

pub(crate) mod cargo;
pub(crate) mod codegen;
pub(crate) mod config;
pub(crate) mod error;
pub(crate) mod ir;
pub(crate) mod metadata;
pub(crate) mod tool;

// Re-export the small public API at the crate root.
pub use codegen::Outcome;
pub use config::{Config, Language, compile};
pub use error::{EmptyIrCache, ToolFailure, ToolNotFound, UnknownLanguage};
