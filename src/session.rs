//! Interactive elementary-row-operation session
//!
//! A single caller applies row operations one at a time to a retained
//! working matrix. A failed step leaves the working matrix untouched.

use crate::ero::RowOperation;
use crate::error::{MatrixError, Result};
use crate::matrix::Matrix;
use crate::trace::StepTrace;
use log::debug;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Idle,
    Active { working: Matrix, steps: usize },
}

#[derive(Clone, Debug, Default)]
pub struct EroSession {
    state: SessionState,
}

impl EroSession {
    pub fn new() -> Self {
        EroSession::default()
    }

    /// Bind `matrix` as the working matrix, discarding any previous one
    pub fn start(&mut self, matrix: Matrix, trace: &mut StepTrace) {
        debug!("session started with {}", matrix.shape());
        trace.push("--- Interactive Elementary Row Operations ---");
        trace.matrix("Working Matrix:", &matrix);
        self.state = SessionState::Active {
            working: matrix,
            steps: 0,
        };
    }

    /// Apply one operation to the working matrix.
    ///
    /// Fails with `NoActiveSession` when idle. On any other failure the
    /// session stays active with its previous matrix.
    pub fn apply(&mut self, op: &RowOperation, trace: &mut StepTrace) -> Result<&Matrix> {
        let SessionState::Active { working, steps } = &mut self.state else {
            return Err(trace.fail(MatrixError::NoActiveSession));
        };

        let next = op.apply(working, trace)?;
        *working = next;
        *steps += 1;
        debug!("session step {} applied: {}", steps, op);
        trace.push(format!("Step {} complete.", steps));
        Ok(&*working)
    }

    /// Return to idle from any state
    pub fn reset(&mut self) {
        debug!("session reset");
        self.state = SessionState::Idle;
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active { .. })
    }

    pub fn working(&self) -> Option<&Matrix> {
        match &self.state {
            SessionState::Active { working, .. } => Some(working),
            SessionState::Idle => None,
        }
    }

    /// Number of successful steps since `start`; zero when idle
    pub fn step_count(&self) -> usize {
        match self.state {
            SessionState::Active { steps, .. } => steps,
            SessionState::Idle => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rational::Rational;

    fn m(rows: &[&[i64]]) -> Matrix {
        Matrix::from_integers(rows).unwrap()
    }

    #[test]
    fn test_idle_session_rejects_steps() {
        let mut session = EroSession::new();
        let mut trace = StepTrace::new();
        let op = RowOperation::Swap { first: 1, second: 2 };
        assert_eq!(session.apply(&op, &mut trace), Err(MatrixError::NoActiveSession));
        assert!(!session.is_active());
    }

    #[test]
    fn test_steps_replace_working_matrix() {
        let mut session = EroSession::new();
        let mut trace = StepTrace::new();
        session.start(m(&[&[1, 2], &[3, 4]]), &mut trace);

        session
            .apply(&RowOperation::Swap { first: 1, second: 2 }, &mut trace)
            .unwrap();
        session
            .apply(
                &RowOperation::AddScaled {
                    target: 2,
                    source: 1,
                    scalar: Rational::new(-1, 3).unwrap(),
                },
                &mut trace,
            )
            .unwrap();

        let expected = Matrix::new(vec![
            vec![Rational::from(3), Rational::from(4)],
            vec![Rational::zero(), Rational::new(2, 3).unwrap()],
        ])
        .unwrap();
        assert_eq!(session.working(), Some(&expected));
        assert_eq!(session.step_count(), 2);
    }

    #[test]
    fn test_failed_step_keeps_matrix() {
        let mut session = EroSession::new();
        let mut trace = StepTrace::new();
        let start = m(&[&[1, 2], &[3, 4]]);
        session.start(start.clone(), &mut trace);

        let bad = RowOperation::Scale {
            row: 1,
            scalar: Rational::zero(),
        };
        assert_eq!(session.apply(&bad, &mut trace), Err(MatrixError::ZeroScalarDisallowed));
        let out_of_range = RowOperation::Swap { first: 1, second: 5 };
        assert!(session.apply(&out_of_range, &mut trace).is_err());

        assert!(session.is_active());
        assert_eq!(session.working(), Some(&start));
        assert_eq!(session.step_count(), 0);
    }

    #[test]
    fn test_restart_and_reset() {
        let mut session = EroSession::new();
        let mut trace = StepTrace::new();
        session.start(m(&[&[1]]), &mut trace);
        session
            .apply(
                &RowOperation::Scale {
                    row: 1,
                    scalar: Rational::from(2),
                },
                &mut trace,
            )
            .unwrap();
        session.start(m(&[&[5]]), &mut trace);
        assert_eq!(session.step_count(), 0);

        session.reset();
        assert_eq!(session.state(), &SessionState::Idle);
        assert_eq!(session.working(), None);
    }
}
