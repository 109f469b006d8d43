//! keycalc-engine - Keypad calculator engine
//!
//! A small input state machine that turns keystrokes and button presses into
//! a running display, with binary arithmetic, scientific functions and a
//! memory register.
//!
//! # Features
//!
//! - **Eager evaluation**: operators apply left to right as soon as the next
//!   operator or equals arrives, no precedence (`5 + 3 * 2 =` is `16`)
//! - **Scientific functions**: trig in degrees, `log`, `ln`, `sqrt`,
//!   `factorial`, `inverse`, `percent`, constants
//! - **Memory register**: `M+`, `M-`, `MR`, `MC`
//! - **Error auto-revert**: failures show `Error` and reset after a fixed
//!   delay, driven by [`Session`]
//!
//! # Example
//!
//! ```rust
//! use keycalc_engine::{Calculator, Function, Operator};
//!
//! let mut calc = Calculator::new();
//! calc.input_digit('9');
//! calc.apply_function(Function::Sqrt);
//! calc.input_operator(Operator::Add);
//! calc.input_digit('4');
//! calc.equals();
//! assert_eq!(calc.display(), "7");
//! ```
//!
//! # Functions
//!
//! | Button | Result | Fails with |
//! |--------|--------|------------|
//! | `sin` `cos` `tan` | trig of degrees | |
//! | `log` `ln` | base-10 / natural log | `InvalidDomain` for x ≤ 0 |
//! | `sqrt` | square root | `InvalidDomain` for x < 0 |
//! | `square` | x² | |
//! | `factorial` | n! | `InvalidDomain` (negative, fractional), `Overflow` (n > 170) |
//! | `inverse` | 1/x | `DivisionByZero` for 0 |
//! | `percent` | x/100 | |
//! | `negate` `abs` | -x, \|x\| | |
//! | `pi` `e` | constant | |
//! | `power` | waits for the exponent | |

pub mod engine;
pub mod error;
pub mod functions;
pub mod keymap;
pub mod numfmt;
pub mod operator;
pub mod session;

// Re-exports for convenience
pub use engine::{Calculator, ErrorTicket, Snapshot};
pub use error::{CalcError, Result};
pub use functions::{factorial, to_radians, Function};
pub use keymap::{action_for_key, Action, UnknownInput, KEY_BINDINGS};
pub use numfmt::format_result;
pub use operator::{calculate, Operator};
pub use session::{Session, SessionConfig, SessionHandle};
