//! Unit tests for control point import and the GCP list format.
//!
//! These tests cover row parsing, batch import with projection handling, and
//! GCP list reading/writing.
