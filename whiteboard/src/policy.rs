use crate::element::ElementRecord;
use crate::message::Role;

/// Decides which sessions may perform which mutating operations. Injected
/// into the relay loop so dispatch code stays variant-agnostic.
pub trait AuthorizationPolicy: Send {
    fn can_clear(&self, role: Role) -> bool;
    fn can_edit(&self, role: Role, element: &ElementRecord) -> bool;
}

/// Anyone may mutate or clear.
pub struct OpenPolicy;

impl AuthorizationPolicy for OpenPolicy {
    fn can_clear(&self, _role: Role) -> bool {
        true
    }

    fn can_edit(&self, _role: Role, _element: &ElementRecord) -> bool {
        true
    }
}

/// Only a teacher may clear; element edits need the teacher role or an
/// explicit `allowStudentEdit` flag on the element payload.
pub struct RoleGatedPolicy;

impl AuthorizationPolicy for RoleGatedPolicy {
    fn can_clear(&self, role: Role) -> bool {
        role == Role::Teacher
    }

    fn can_edit(&self, role: Role, element: &ElementRecord) -> bool {
        role == Role::Teacher || element.allows_student_edit()
    }
}
