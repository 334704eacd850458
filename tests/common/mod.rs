#![allow(dead_code)]

pub mod builders;
