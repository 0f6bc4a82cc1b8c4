//! Rule data bundled with the crate.
//!
//! `doctor.txt` is the classic Rogerian therapist script. It is parsed once,
//! on first use, by [`crate::default_store`].

pub(crate) const DOCTOR: &str = include_str!("rules/doctor.txt");
