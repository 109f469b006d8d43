//! Calculator - keypad input state machine
//!
//! Reduces digit, operator, function and memory inputs into a current
//! operand, a pending operator and a display string. Operators evaluate
//! eagerly left to right: `5 + 3 * 2 =` shows `16`.
//!
//! Failures never escape an operation. They put the calculator into an
//! error window (display reads `Error`) identified by an [`ErrorTicket`];
//! the window is closed by [`Calculator::revert_error`], normally driven by
//! the timer in [`crate::session`].

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{finite, CalcError, Result};
use crate::functions::Function;
use crate::keymap::Action;
use crate::numfmt::{format_result, parse_operand, ERROR_TEXT};
use crate::operator::{calculate, Operator};

/// Identifies one error window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorTicket(u64);

#[derive(Debug, Clone)]
struct ErrorWindow {
    ticket: ErrorTicket,
    error: CalcError,
}

/// What the presentation layer renders after every operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Main display
    pub display: String,
    /// Expression preview (`3 +`), or the error message during an error window
    pub expression: String,
    /// Formatted memory value; `None` hides the memory indicator
    pub memory: Option<String>,
    /// Error display state
    pub error: bool,
}

/// Keypad calculator state
#[derive(Debug, Clone)]
pub struct Calculator {
    current_input: String,
    previous_input: Option<f64>,
    operator: Option<Operator>,
    waiting_for_new_operand: bool,
    memory: f64,
    current_expression: String,
    /// Unmatched `(` count; parentheses are display text only
    open_parentheses: usize,
    error: Option<ErrorWindow>,
    tickets_issued: u64,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator {
    pub fn new() -> Self {
        Self {
            current_input: "0".to_string(),
            previous_input: None,
            operator: None,
            waiting_for_new_operand: false,
            memory: 0.0,
            current_expression: String::new(),
            open_parentheses: 0,
            error: None,
            tickets_issued: 0,
        }
    }

    // ========================================================================
    // Outbound observations
    // ========================================================================

    pub fn display(&self) -> &str {
        &self.current_input
    }

    pub fn expression(&self) -> &str {
        &self.current_expression
    }

    pub fn memory(&self) -> f64 {
        self.memory
    }

    pub fn previous_operand(&self) -> Option<f64> {
        self.previous_input
    }

    pub fn pending_operator(&self) -> Option<Operator> {
        self.operator
    }

    pub fn is_waiting_for_operand(&self) -> bool {
        self.waiting_for_new_operand
    }

    pub fn open_parentheses(&self) -> usize {
        self.open_parentheses
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn error(&self) -> Option<&CalcError> {
        self.error.as_ref().map(|w| &w.error)
    }

    pub fn error_ticket(&self) -> Option<ErrorTicket> {
        self.error.as_ref().map(|w| w.ticket)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            display: self.current_input.clone(),
            expression: match &self.error {
                Some(window) => window.error.to_string(),
                None => self.current_expression.clone(),
            },
            memory: (self.memory != 0.0).then(|| format_result(self.memory)),
            error: self.is_error(),
        }
    }

    // ========================================================================
    // Inbound operations
    // ========================================================================

    /// Dispatch one action
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Digit(d) => self.input_digit(d),
            Action::Decimal => self.input_decimal(),
            Action::Operator(op) => self.input_operator(op),
            Action::Function(function) => self.apply_function(function),
            Action::Equals => self.equals(),
            Action::Clear => self.clear(),
            Action::AllClear => self.all_clear(),
            Action::Backspace => self.backspace(),
            Action::MemoryAdd => self.memory_add(),
            Action::MemorySubtract => self.memory_subtract(),
            Action::MemoryRecall => self.memory_recall(),
            Action::MemoryClear => self.memory_clear(),
            Action::OpenParenthesis => self.input_open_parenthesis(),
            Action::CloseParenthesis => self.input_close_parenthesis(),
        }
    }

    pub fn input_digit(&mut self, digit: char) {
        if self.ignored("digit") {
            return;
        }
        if !digit.is_ascii_digit() {
            warn!(?digit, "Not a digit, ignored");
            return;
        }

        if self.waiting_for_new_operand {
            self.current_input = digit.to_string();
            self.waiting_for_new_operand = false;
        } else if self.current_input == "0" {
            self.current_input = digit.to_string();
        } else {
            self.current_input.push(digit);
        }
    }

    pub fn input_decimal(&mut self) {
        if self.ignored("decimal") {
            return;
        }

        if self.waiting_for_new_operand {
            self.current_input = "0.".to_string();
            self.waiting_for_new_operand = false;
        } else if !self.current_input.contains('.') {
            self.current_input.push('.');
        }
    }

    pub fn backspace(&mut self) {
        if self.ignored("backspace") {
            return;
        }

        if self.current_input.chars().count() > 1 {
            self.current_input.pop();
        } else {
            self.current_input = "0".to_string();
        }
    }

    /// Commit the current operand and set `op` as the pending operator
    ///
    /// With an operator already pending, `previous op_prev current` is
    /// evaluated first and becomes the new left operand.
    pub fn input_operator(&mut self, op: Operator) {
        if self.ignored("operator") {
            return;
        }
        if let Err(e) = self.commit_operator(op) {
            self.fail(e);
        }
    }

    fn commit_operator(&mut self, op: Operator) -> Result<()> {
        let value = finite(self.current_operand())?;

        match (self.previous_input, self.operator) {
            (None, _) => self.previous_input = Some(value),
            (Some(previous), Some(pending)) => {
                let result = calculate(previous, value, pending)?;
                debug!(previous, pending = %pending, value, result, "chained");
                self.current_input = format_result(result);
                self.previous_input = Some(result);
            },
            (Some(_), None) => {},
        }

        self.waiting_for_new_operand = true;
        self.operator = Some(op);
        self.update_expression();
        Ok(())
    }

    pub fn equals(&mut self) {
        if self.ignored("equals") {
            return;
        }

        let (Some(previous), Some(op)) = (self.previous_input, self.operator) else {
            return;
        };

        let value = self.current_operand();
        match calculate(previous, value, op) {
            Ok(result) => {
                debug!(previous, op = %op, value, result, "equals");
                self.current_input = format_result(result);
                self.previous_input = None;
                self.operator = None;
                self.waiting_for_new_operand = true;
                self.current_expression.clear();
            },
            Err(e) => self.fail(e),
        }
    }

    pub fn apply_function(&mut self, function: Function) {
        if self.ignored("function") {
            return;
        }
        if let Some(op) = function.deferred_operator() {
            return self.input_operator(op);
        }

        match function.evaluate(self.current_operand()) {
            Some(Ok(result)) => {
                self.current_input = format_result(result);
                self.waiting_for_new_operand = true;
            },
            Some(Err(e)) => self.fail(e),
            None => {},
        }
    }

    /// Soft clear: only the current operand
    pub fn clear(&mut self) {
        if self.ignored("clear") {
            return;
        }
        self.current_input = "0".to_string();
    }

    /// Reset calculation state; memory is kept
    pub fn all_clear(&mut self) {
        if self.ignored("all-clear") {
            return;
        }
        self.reset();
    }

    pub fn memory_add(&mut self) {
        if self.ignored("memory add") {
            return;
        }
        let value = self.memory + self.current_operand();
        self.store_memory(value);
    }

    pub fn memory_subtract(&mut self) {
        if self.ignored("memory subtract") {
            return;
        }
        let value = self.memory - self.current_operand();
        self.store_memory(value);
    }

    pub fn memory_recall(&mut self) {
        if self.ignored("memory recall") {
            return;
        }
        self.current_input = format_result(self.memory);
        self.waiting_for_new_operand = true;
    }

    pub fn memory_clear(&mut self) {
        if self.ignored("memory clear") {
            return;
        }
        self.memory = 0.0;
        debug!("Memory cleared");
    }

    /// Start a group: a fresh `(` or an implicit `*(` after an operand
    pub fn input_open_parenthesis(&mut self) {
        if self.ignored("open parenthesis") {
            return;
        }

        if self.waiting_for_new_operand || self.current_input == "0" {
            self.current_input = "(".to_string();
            self.waiting_for_new_operand = false;
        } else {
            self.current_input.push_str("*(");
        }
        self.open_parentheses += 1;
    }

    pub fn input_close_parenthesis(&mut self) {
        if self.ignored("close parenthesis") {
            return;
        }

        if self.open_parentheses > 0 {
            self.current_input.push(')');
            self.open_parentheses -= 1;
        }
    }

    // ========================================================================
    // Error window
    // ========================================================================

    /// Close the error window identified by `ticket` with an all-clear
    ///
    /// Returns `false` when no window is open or the ticket belongs to an
    /// earlier window, so a revert takes effect at most once.
    pub fn revert_error(&mut self, ticket: ErrorTicket) -> bool {
        match &self.error {
            Some(window) if window.ticket == ticket => {
                info!(ticket = ticket.0, error = %window.error, "Error display reverted");
                self.error = None;
                self.reset();
                true
            },
            _ => {
                debug!(ticket = ticket.0, "Stale error revert ignored");
                false
            },
        }
    }

    fn fail(&mut self, error: CalcError) {
        self.tickets_issued += 1;
        let ticket = ErrorTicket(self.tickets_issued);
        warn!(ticket = ticket.0, %error, input = %self.current_input, "Calculation failed");

        self.current_input = ERROR_TEXT.to_string();
        self.error = Some(ErrorWindow { ticket, error });
    }

    /// Input arriving during an error window is dropped
    fn ignored(&self, operation: &str) -> bool {
        if let Some(window) = &self.error {
            debug!(operation, ticket = window.ticket.0, "Input ignored during error display");
            true
        } else {
            false
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn current_operand(&self) -> f64 {
        parse_operand(&self.current_input)
    }

    fn store_memory(&mut self, value: f64) {
        match finite(value) {
            Ok(value) => {
                self.memory = value;
                debug!(memory = value, "Memory updated");
            },
            Err(e) => self.fail(e),
        }
    }

    fn update_expression(&mut self) {
        if let (Some(previous), Some(op)) = (self.previous_input, self.operator) {
            self.current_expression = format!("{} {}", format_result(previous), op);
        }
    }

    fn reset(&mut self) {
        self.current_input = "0".to_string();
        self.previous_input = None;
        self.operator = None;
        self.waiting_for_new_operand = false;
        self.current_expression.clear();
        self.open_parentheses = 0;
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::keymap::action_for_key;

    fn press(calc: &mut Calculator, keys: &str) {
        for key in keys.split_whitespace() {
            let action = action_for_key(key).unwrap_or_else(|| key.parse().unwrap());
            calc.apply(action);
        }
    }

    #[test]
    fn test_initial_state() {
        let calc = Calculator::new();
        assert_eq!(calc.display(), "0");
        assert_eq!(calc.expression(), "");
        assert_eq!(calc.previous_operand(), None);
        assert_eq!(calc.pending_operator(), None);
        assert!(!calc.is_waiting_for_operand());
        assert!(!calc.is_error());
    }

    #[test]
    fn test_no_leading_zero() {
        let mut calc = Calculator::new();
        press(&mut calc, "0 5");
        assert_eq!(calc.display(), "5");
        press(&mut calc, "0 7");
        assert_eq!(calc.display(), "507");
    }

    #[test]
    fn test_decimal_entry() {
        let mut calc = Calculator::new();
        press(&mut calc, "decimal 5 decimal 2");
        assert_eq!(calc.display(), "0.52");

        press(&mut calc, "+ decimal");
        assert_eq!(calc.display(), "0.");
        assert!(!calc.is_waiting_for_operand());
    }

    #[test]
    fn test_backspace_never_empty() {
        let mut calc = Calculator::new();
        press(&mut calc, "1 2");
        calc.backspace();
        assert_eq!(calc.display(), "1");
        calc.backspace();
        assert_eq!(calc.display(), "0");
        calc.backspace();
        assert_eq!(calc.display(), "0");
    }

    #[test]
    fn test_operator_sets_expression_preview() {
        let mut calc = Calculator::new();
        press(&mut calc, "3 +");
        assert_eq!(calc.expression(), "3 +");
        assert_eq!(calc.previous_operand(), Some(3.0));
        assert_eq!(calc.pending_operator(), Some(Operator::Add));
        assert!(calc.is_waiting_for_operand());
        // Display keeps the operand until a new digit arrives
        assert_eq!(calc.display(), "3");
    }

    #[test]
    fn test_eager_left_to_right() {
        let mut calc = Calculator::new();
        press(&mut calc, "5 + 3 * 2 equals");
        assert_eq!(calc.display(), "16");
        assert_eq!(calc.expression(), "");
        assert_eq!(calc.pending_operator(), None);
    }

    #[test]
    fn test_chaining_shows_intermediate_result() {
        let mut calc = Calculator::new();
        press(&mut calc, "5 + 3 *");
        assert_eq!(calc.display(), "8");
        assert_eq!(calc.expression(), "8 *");
        assert_eq!(calc.previous_operand(), Some(8.0));
    }

    #[test]
    fn test_equals_without_pending_is_noop() {
        let mut calc = Calculator::new();
        press(&mut calc, "4 2 equals");
        assert_eq!(calc.display(), "42");
        assert!(!calc.is_waiting_for_operand());
    }

    #[test]
    fn test_digit_after_equals_starts_new_operand() {
        let mut calc = Calculator::new();
        press(&mut calc, "2 + 2 equals 7");
        assert_eq!(calc.display(), "7");
    }

    #[test]
    fn test_floating_point_noise_hidden() {
        let mut calc = Calculator::new();
        press(&mut calc, "decimal 1 + decimal 2 equals");
        assert_eq!(calc.display(), "0.3");
    }

    #[test]
    fn test_power_function_waits_for_exponent() {
        let mut calc = Calculator::new();
        press(&mut calc, "2 power");
        assert_eq!(calc.pending_operator(), Some(Operator::Power));
        assert_eq!(calc.expression(), "2 **");
        press(&mut calc, "1 0 equals");
        assert_eq!(calc.display(), "1024");
    }

    #[test]
    fn test_unary_function_result() {
        let mut calc = Calculator::new();
        press(&mut calc, "5 factorial");
        assert_eq!(calc.display(), "120");
        assert!(calc.is_waiting_for_operand());

        press(&mut calc, "9 sqrt");
        assert_eq!(calc.display(), "3");

        press(&mut calc, "negate");
        assert_eq!(calc.display(), "-3");
    }

    #[test]
    fn test_function_on_right_operand() {
        let mut calc = Calculator::new();
        press(&mut calc, "1 0 + 1 6 sqrt equals");
        assert_eq!(calc.display(), "14");
    }

    #[test]
    fn test_clear_keeps_pending_operation() {
        let mut calc = Calculator::new();
        press(&mut calc, "8 - 5 clear 3 equals");
        assert_eq!(calc.display(), "5");
    }

    #[test]
    fn test_all_clear_keeps_memory() {
        let mut calc = Calculator::new();
        press(&mut calc, "9 m-plus 1 + 2 ( all-clear");
        assert_eq!(calc.display(), "0");
        assert_eq!(calc.previous_operand(), None);
        assert_eq!(calc.pending_operator(), None);
        assert_eq!(calc.expression(), "");
        assert_eq!(calc.open_parentheses(), 0);
        assert_eq!(calc.memory(), 9.0);
    }

    #[test]
    fn test_memory_register() {
        let mut calc = Calculator::new();
        press(&mut calc, "5 m-plus clear 2 m-plus clear 1 m-minus");
        assert_eq!(calc.memory(), 6.0);
        assert_eq!(calc.snapshot().memory.as_deref(), Some("6"));

        press(&mut calc, "all-clear mr");
        assert_eq!(calc.display(), "6");
        assert!(calc.is_waiting_for_operand());

        press(&mut calc, "mc");
        assert_eq!(calc.memory(), 0.0);
        assert_eq!(calc.snapshot().memory, None);
    }

    #[test]
    fn test_memory_recall_is_formatted() {
        let mut calc = Calculator::new();
        press(&mut calc, "decimal 1 m-plus clear decimal 2 m-plus");
        assert_eq!(calc.memory(), 0.1 + 0.2);

        press(&mut calc, "mr");
        assert_eq!(calc.display(), "0.3");
        assert_eq!(calc.snapshot().memory.as_deref(), Some("0.3"));
    }

    #[test]
    fn test_memory_add_then_clear_hides_indicator() {
        let mut calc = Calculator::new();
        press(&mut calc, "3 m-plus mc");
        assert_eq!(calc.memory(), 0.0);
        assert_eq!(calc.snapshot().memory, None);
    }

    #[test]
    fn test_parentheses_are_display_only() {
        let mut calc = Calculator::new();
        press(&mut calc, "( 2");
        assert_eq!(calc.display(), "(2");
        assert_eq!(calc.open_parentheses(), 1);

        press(&mut calc, ") )");
        assert_eq!(calc.display(), "(2)");
        assert_eq!(calc.open_parentheses(), 0);
    }

    #[test]
    fn test_open_parenthesis_after_operand_is_implicit_multiply() {
        let mut calc = Calculator::new();
        press(&mut calc, "5 (");
        assert_eq!(calc.display(), "5*(");
        // Only the leading numeric literal participates in evaluation
        press(&mut calc, "+ 1 equals");
        assert_eq!(calc.display(), "6");
    }

    #[test]
    fn test_division_by_zero_opens_error_window() {
        let mut calc = Calculator::new();
        press(&mut calc, "8 / 0 equals");
        assert_eq!(calc.display(), ERROR_TEXT);
        assert_eq!(calc.error(), Some(&CalcError::DivisionByZero));

        let snapshot = calc.snapshot();
        assert!(snapshot.error);
        assert_eq!(snapshot.expression, "Division by zero");
    }

    #[test]
    fn test_chained_division_by_zero_fails() {
        let mut calc = Calculator::new();
        press(&mut calc, "8 / 0 +");
        assert_eq!(calc.error(), Some(&CalcError::DivisionByZero));
    }

    #[test]
    fn test_input_ignored_during_error_window() {
        let mut calc = Calculator::new();
        press(&mut calc, "1 negate log");
        assert!(calc.is_error());

        press(&mut calc, "5 decimal + m-plus all-clear");
        assert_eq!(calc.display(), ERROR_TEXT);
        assert_eq!(calc.memory(), 0.0);
        assert!(calc.is_error());
    }

    #[test]
    fn test_revert_fires_once() {
        let mut calc = Calculator::new();
        press(&mut calc, "2 + 3 * 0 inverse");
        let ticket = calc.error_ticket().unwrap();

        assert!(calc.revert_error(ticket));
        assert_eq!(calc.snapshot(), Calculator::new().snapshot());
        assert!(!calc.revert_error(ticket));
    }

    #[test]
    fn test_stale_ticket_does_not_close_new_window() {
        let mut calc = Calculator::new();
        press(&mut calc, "1 / 0 equals");
        let first = calc.error_ticket().unwrap();
        assert!(calc.revert_error(first));

        press(&mut calc, "2 negate sqrt");
        let second = calc.error_ticket().unwrap();
        assert_ne!(first, second);
        assert!(!calc.revert_error(first));
        assert!(calc.is_error());
        assert!(calc.revert_error(second));
    }

    #[test]
    fn test_operator_on_non_numeric_operand_fails() {
        let mut calc = Calculator::new();
        press(&mut calc, "( +");
        assert_eq!(calc.error(), Some(&CalcError::NonFinite));
    }

    #[test]
    fn test_power_overflow_is_non_finite() {
        let mut calc = Calculator::new();
        press(&mut calc, "1 0 power 4 0 0 equals");
        assert_eq!(calc.error(), Some(&CalcError::NonFinite));
    }
}
