//! pebble-eval - Tree-Walking Evaluator
//!
//! ============================================================================
//! EVALUATION OVERVIEW
//! ============================================================================
//!
//! There is no separate compilation step: [`Evaluator::run`] walks the
//! [`pebble_par::ast::Program`] directly, one node at a time, and a
//! program's "execution" is nothing more than the sequence of calls that
//! walk produces. Two passes happen before anything runs — every
//! top-level function is registered by name (§ `Evaluator::run`), then
//! every top-level variable and array is evaluated into globals — so
//! that a function defined after `main` in the source text is still
//! callable from it, and so that `main` sees every global already
//! initialized no matter where in the file it's declared.
//!
//! [`env::Env`] is the scope chain: one frame per block, one extra frame
//! per function call for its parameters, outward name lookup, and
//! innermost-wins shadowing on declaration. [`value::Value`] is what a
//! Pebble expression actually evaluates to; [`eval::Control`] is how a
//! `return` ascends out of nested blocks without unwinding the Rust
//! stack. [`builtins`] holds the eight functions every Pebble program
//! gets for free, checked ahead of the user's own function table.

mod builtins;
mod env;
mod eval;
mod value;

pub use env::Env;
pub use eval::{Control, Evaluator};
pub use value::Value;

#[cfg(test)]
mod tests {
    use super::*;
    use pebble_lex::Lexer;
    use pebble_par::Parser;
    use pebble_util::{Interner, PebbleError, PebbleResult};

    fn run(src: &str) -> PebbleResult<Value> {
        let mut interner = Interner::new();
        let lexer = Lexer::new(src, &mut interner);
        let program = Parser::new(lexer)?.parse_program()?;
        Evaluator::run(&program, &interner).map_err(PebbleError::from)
    }

    #[test]
    fn fibonacci_recursion() {
        let src = r#"
            int fib(int n) {
                if (n <= 1) { return n; }
                return fib(n - 1) + fib(n - 2);
            }
            int main() {
                return fib(10);
            }
        "#;
        assert_eq!(run(src).unwrap(), Value::Int(55));
    }

    #[test]
    fn block_scope_shadows_without_mutating_outer() {
        let src = r#"
            int main() {
                int x = 1;
                {
                    int x = 2;
                }
                return x;
            }
        "#;
        assert_eq!(run(src).unwrap(), Value::Int(1));
    }

    #[test]
    fn assignment_climbs_past_block_scope_to_outer_binding() {
        let src = r#"
            int main() {
                int x = 1;
                {
                    x = 2;
                }
                return x;
            }
        "#;
        assert_eq!(run(src).unwrap(), Value::Int(2));
    }

    #[test]
    fn functions_do_not_see_caller_locals() {
        let src = r#"
            int helper() {
                return secret;
            }
            int main() {
                int secret = 42;
                return helper();
            }
        "#;
        let err = run(src).unwrap_err();
        assert!(matches!(err, PebbleError::Runtime(_)));
    }

    #[test]
    fn functions_see_globals() {
        let src = r#"
            int counter = 7;
            int helper() {
                return counter;
            }
            int main() {
                return helper();
            }
        "#;
        assert_eq!(run(src).unwrap(), Value::Int(7));
    }

    #[test]
    fn arrays_passed_to_functions_alias_the_caller() {
        let src = r#"
            void zero_out(int a[]) {
                a[0] = 0;
            }
            int main() {
                int[3] xs;
                xs[0] = 9;
                zero_out(xs);
                return xs[0];
            }
        "#;
        assert_eq!(run(src).unwrap(), Value::Int(0));
    }

    #[test]
    fn or_short_circuits_and_never_evaluates_the_right_side() {
        let src = r#"
            bool touched = false;
            bool set_touched_and_return_true() {
                touched = true;
                return true;
            }
            int main() {
                bool result = true || set_touched_and_return_true();
                if (touched) { return 1; }
                return 0;
            }
        "#;
        assert_eq!(run(src).unwrap(), Value::Int(0));
    }

    #[test]
    fn and_short_circuits_and_never_evaluates_the_right_side() {
        let src = r#"
            bool touched = false;
            bool set_touched_and_return_true() {
                touched = true;
                return true;
            }
            int main() {
                bool result = false && set_touched_and_return_true();
                if (touched) { return 1; }
                return 0;
            }
        "#;
        assert_eq!(run(src).unwrap(), Value::Int(0));
    }

    #[test]
    fn integer_division_truncates_toward_zero() {
        let src = r#"
            int main() {
                return (0 - 7) / 2;
            }
        "#;
        // -7 / 2 == -3 truncated toward zero, not -4 (floor division).
        assert_eq!(run(src).unwrap(), Value::Int(-3));
    }

    #[test]
    fn division_by_zero_is_a_runtime_error() {
        let src = r#"
            int main() {
                return 1 / 0;
            }
        "#;
        let err = run(src).unwrap_err();
        assert!(matches!(err, PebbleError::Runtime(_)));
    }

    #[test]
    fn out_of_bounds_array_read_is_a_runtime_error() {
        let src = r#"
            int main() {
                int[3] xs;
                return xs[5];
            }
        "#;
        let err = run(src).unwrap_err();
        assert!(matches!(err, PebbleError::Runtime(_)));
    }

    #[test]
    fn for_loop_update_runs_between_iterations() {
        let src = r#"
            int main() {
                int total = 0;
                for (int i = 0; i < 5; i = i + 1) {
                    total = total + i;
                }
                return total;
            }
        "#;
        assert_eq!(run(src).unwrap(), Value::Int(10));
    }

    #[test]
    fn string_concatenation_with_int_coerces_via_display() {
        let src = r#"
            string main_result;
            int main() {
                main_result = "count: " + 3;
                return length(main_result);
            }
        "#;
        // "count: " (7 chars) + "3" (1 char) = 8.
        assert_eq!(run(src).unwrap(), Value::Int(8));
    }

    #[test]
    fn builtins_shadow_same_named_user_function() {
        let src = r#"
            int length(string s) {
                return 999;
            }
            int main() {
                return length("ab");
            }
        "#;
        assert_eq!(run(src).unwrap(), Value::Int(2));
    }

    #[test]
    fn undefined_variable_is_a_runtime_error() {
        let src = r#"
            int main() {
                return unbound;
            }
        "#;
        let err = run(src).unwrap_err();
        assert!(matches!(err, PebbleError::Runtime(_)));
    }
}
