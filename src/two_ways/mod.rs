//! Each of the below modules consumes the same deferred value in two ways.
//! Each module is structured as follows (where `scenario` is the module
//! name):
//!
//! ```
//! pub mod scenario {
//!     //! A producer shared by both consumers, plus the consumers. Driving the
//!     //! scheduler after either `run` writes the same lines to the sink at
//!     //! the same logical times.
//!
//!     pub mod callback {
//!         pub fn run() {
//!             // registers continuations with `Deferred::then`.
//!         }
//!     }
//!
//!     pub mod sequential {
//!         pub fn run() {
//!             // spawns a task which `.await`s the deferred value.
//!         }
//!     }
//! }
//! ```

pub mod first_promise;
pub mod get_data;
