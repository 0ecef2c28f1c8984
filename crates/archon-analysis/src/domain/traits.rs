//! Capabilities shared by units and members, so rules can be written once
//! for every element kind.

use archon_core::types::UnitId;

use super::annotation::Annotation;
use super::member::{Constructor, Field, Member, MemberInfo, Method};
use super::types::Modifiers;
use super::unit::Unit;

pub trait HasName {
    /// Fully-qualified name for units, plain name for members.
    fn name(&self) -> &str;
}

pub trait HasModifiers {
    fn modifiers(&self) -> Modifiers;
}

pub trait HasAnnotations {
    fn annotations(&self) -> &[Annotation];
}

pub trait HasOwner {
    fn owner(&self) -> UnitId;
}

impl HasName for Unit {
    fn name(&self) -> &str {
        &self.name
    }
}

impl HasModifiers for Unit {
    fn modifiers(&self) -> Modifiers {
        self.modifiers
    }
}

impl HasAnnotations for Unit {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

trait MemberLike {
    fn member_info(&self) -> &MemberInfo;
}

impl MemberLike for Member {
    fn member_info(&self) -> &MemberInfo {
        self.info()
    }
}

macro_rules! member_like {
    ($($ty:ty),*) => {
        $(
            impl MemberLike for $ty {
                fn member_info(&self) -> &MemberInfo {
                    &self.info
                }
            }
        )*
    };
}

member_like!(Field, Method, Constructor);

macro_rules! member_traits {
    ($($ty:ty),*) => {
        $(
            impl HasName for $ty {
                fn name(&self) -> &str {
                    &self.member_info().name
                }
            }

            impl HasModifiers for $ty {
                fn modifiers(&self) -> Modifiers {
                    self.member_info().modifiers
                }
            }

            impl HasAnnotations for $ty {
                fn annotations(&self) -> &[Annotation] {
                    &self.member_info().annotations
                }
            }

            impl HasOwner for $ty {
                fn owner(&self) -> UnitId {
                    self.member_info().owner
                }
            }
        )*
    };
}

member_traits!(Member, Field, Method, Constructor);
