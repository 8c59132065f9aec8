//! Async I/O traits and utilities.
//!
//! Font downloads are streamed from an [`AsyncRead`] straight into an
//! [`AsyncWrite`] so a full asset never has to sit in memory twice.

pub use tokio::io::{
    copy, AsyncBufRead, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter,
};
