// Utilities module
//
// This module contains common utility functions:
// - validation: Common validation helpers shared by both services' configs

pub mod validation;
