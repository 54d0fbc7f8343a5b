//! Enrollment admission policy.
//!
//! The checks run in a fixed order — key, then capacity, then duplicate —
//! because callers surface a distinct error for each stage and clients
//! depend on which one fires first.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdmissionDenied {
    #[error("an enrollment key is required for this course")]
    KeyRequired,
    #[error("the supplied enrollment key does not match")]
    KeyMismatch,
    #[error("the course has reached its enrollment limit")]
    CourseFull,
    #[error("the student is already enrolled in this course")]
    AlreadyEnrolled,
}

/// The course attributes that gate self-service enrollment.
#[derive(Debug, Clone)]
pub struct CourseGate {
    pub requires_key: bool,
    pub enrollment_key: Option<String>,
    /// 0 means unlimited.
    pub max_enrollments: i32,
}

impl CourseGate {
    /// Decides whether a student may enroll. `active_count` is the number of
    /// currently active enrollments; `already_enrolled` is true if any
    /// enrollment row exists for the (student, course) pair, whatever its
    /// status.
    pub fn admit(
        &self,
        supplied_key: Option<&str>,
        active_count: u64,
        already_enrolled: bool,
    ) -> Result<(), AdmissionDenied> {
        if self.requires_key {
            let supplied = supplied_key
                .filter(|k| !k.is_empty())
                .ok_or(AdmissionDenied::KeyRequired)?;
            if Some(supplied) != self.enrollment_key.as_deref() {
                return Err(AdmissionDenied::KeyMismatch);
            }
        }

        if self.max_enrollments > 0 && active_count >= self.max_enrollments as u64 {
            return Err(AdmissionDenied::CourseFull);
        }

        if already_enrolled {
            return Err(AdmissionDenied::AlreadyEnrolled);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_course() -> CourseGate {
        CourseGate {
            requires_key: false,
            enrollment_key: None,
            max_enrollments: 0,
        }
    }

    fn keyed_course(key: &str) -> CourseGate {
        CourseGate {
            requires_key: true,
            enrollment_key: Some(key.to_owned()),
            max_enrollments: 0,
        }
    }

    #[test]
    fn open_course_admits() {
        assert_eq!(open_course().admit(None, 0, false), Ok(()));
    }

    #[test]
    fn missing_key_beats_every_other_denial() {
        // Key failures fire before capacity and duplicate checks.
        let mut gate = keyed_course("sesame");
        gate.max_enrollments = 1;
        assert_eq!(gate.admit(None, 5, true), Err(AdmissionDenied::KeyRequired));
        assert_eq!(
            gate.admit(Some(""), 5, true),
            Err(AdmissionDenied::KeyRequired)
        );
        assert_eq!(
            gate.admit(Some("wrong"), 5, true),
            Err(AdmissionDenied::KeyMismatch)
        );
    }

    #[test]
    fn key_must_match_exactly() {
        let gate = keyed_course("sesame");
        assert_eq!(
            gate.admit(Some("Sesame"), 0, false),
            Err(AdmissionDenied::KeyMismatch)
        );
        assert_eq!(gate.admit(Some("sesame"), 0, false), Ok(()));
    }

    #[test]
    fn capacity_fires_before_duplicate() {
        let mut gate = open_course();
        gate.max_enrollments = 2;
        assert_eq!(gate.admit(None, 2, true), Err(AdmissionDenied::CourseFull));
        assert_eq!(gate.admit(None, 3, false), Err(AdmissionDenied::CourseFull));
    }

    #[test]
    fn zero_limit_means_unlimited() {
        assert_eq!(open_course().admit(None, 10_000, false), Ok(()));
    }

    #[test]
    fn duplicate_enrollment_is_denied_last() {
        assert_eq!(
            open_course().admit(None, 0, true),
            Err(AdmissionDenied::AlreadyEnrolled)
        );
    }
}
