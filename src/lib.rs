//! # Joy-Con Probe Library
//!
//! Diagnostic client for the Joy-Con / Pro Controller HID wire protocol.
//!
//! This library provides the protocol codec (output-report framing, input
//! report decoding, CRC-8, rumble encoding, calibration unpacking) and the
//! chunked flash-dump orchestration a transport-agnostic caller drives
//! against a connected controller.

pub mod config;
pub mod dump;
pub mod error;
pub mod hid;
pub mod report;
pub mod session;
