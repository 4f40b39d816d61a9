//! # Unit Components
//!
//! This module organizes the tests for the pipeline's building blocks and for
//! the whole core running small programs.
