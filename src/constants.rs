// ABOUTME: Re-export of application constants from academy-core
// ABOUTME: Status strings, intake rules, listing limits and service endpoints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Academy Enrollment Platform

pub use academy_core::constants::*;
