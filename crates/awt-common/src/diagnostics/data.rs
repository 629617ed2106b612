//! Diagnostic codes and message templates.

use super::{DiagnosticCategory, DiagnosticMessage};

pub mod diagnostic_codes {
    pub const NO_SUCH_MEMBER: u32 = 117;
    pub const BAD_SYMBOL_KIND: u32 = 118;
    pub const AMBIGUOUS_CALL: u32 = 121;
    pub const BAD_ACCESS: u32 = 122;
    pub const PROPERTY_LACKS_GET: u32 = 154;
    pub const OBJECT_PROHIBITED: u32 = 176;
    pub const CANT_INFER_METHOD_TYPE_ARGS: u32 = 411;
    pub const CIRCULAR_CONSTRAINT: u32 = 454;
    pub const INTERFACE_IMPLEMENTED_BY_CONDITIONAL: u32 = 629;
    pub const BAD_INSTANCE_ARG_TYPE: u32 = 1929;
    pub const NON_INVOCABLE_MEMBER_CALLED: u32 = 1955;
    pub const NO_SUCH_MEMBER_OR_EXTENSION: u32 = 1061;
    pub const BAD_AWAIT_ARG: u32 = 1986;
    pub const BAD_AWAIT_ARG_INTRINSIC: u32 = 4001;
    pub const BAD_AWAIT_ARG_VOID_CALL: u32 = 4008;
    pub const BAD_AWAITER_PATTERN: u32 = 4011;
    pub const DOES_NOT_IMPLEMENT_AWAIT_INTERFACE: u32 = 4027;
    pub const NO_CORRESPONDING_ARGUMENT: u32 = 7036;
}

pub mod diagnostic_messages {
    pub const NO_SUCH_MEMBER: &str = "'{0}' does not contain a definition for '{1}'";
    pub const BAD_SYMBOL_KIND: &str = "'{0}' is a {1} but is used like a {2}";
    pub const AMBIGUOUS_CALL: &str =
        "The call is ambiguous between the following methods or properties: '{0}' and '{1}'";
    pub const BAD_ACCESS: &str = "'{0}' is inaccessible due to its protection level";
    pub const PROPERTY_LACKS_GET: &str = "The property or indexer '{0}' cannot be used in this context because it lacks the get accessor";
    pub const OBJECT_PROHIBITED: &str = "Member '{0}' cannot be accessed with an instance reference; qualify it with a type name instead";
    pub const CANT_INFER_METHOD_TYPE_ARGS: &str = "The type arguments for method '{0}' cannot be inferred from the usage. Try specifying the type arguments explicitly.";
    pub const CIRCULAR_CONSTRAINT: &str =
        "Circular constraint dependency involving '{0}' and '{1}'";
    pub const INTERFACE_IMPLEMENTED_BY_CONDITIONAL: &str =
        "Conditional member '{0}' cannot implement interface member '{1}' in type '{2}'";
    pub const BAD_INSTANCE_ARG_TYPE: &str = "'{0}' does not contain a definition for '{1}' and the best extension method overload '{2}' requires a receiver of type '{3}'";
    pub const NON_INVOCABLE_MEMBER_CALLED: &str =
        "Non-invocable member '{0}' cannot be used like a method.";
    pub const NO_SUCH_MEMBER_OR_EXTENSION: &str = "'{0}' does not contain a definition for '{1}' and no accessible extension method '{1}' accepting a first argument of type '{0}' could be found (are you missing a using directive or an assembly reference?)";
    pub const BAD_AWAIT_ARG: &str =
        "'await' requires that the type '{0}' have a suitable 'GetAwaiter' method";
    pub const BAD_AWAIT_ARG_INTRINSIC: &str = "Cannot await '{0}'";
    pub const BAD_AWAIT_ARG_VOID_CALL: &str = "Cannot await 'void'";
    pub const BAD_AWAITER_PATTERN: &str = "'await' requires that the return type '{0}' of '{1}.GetAwaiter()' have suitable 'IsCompleted', 'OnCompleted', and 'GetResult' members, and implement 'INotifyCompletion' or 'ICriticalNotifyCompletion'";
    pub const DOES_NOT_IMPLEMENT_AWAIT_INTERFACE: &str = "'{0}' does not implement '{1}'";
    pub const NO_CORRESPONDING_ARGUMENT: &str =
        "There is no argument given that corresponds to the required parameter '{0}' of '{1}'";
}

macro_rules! messages {
    ($($name:ident),* $(,)?) => {
        &[$(DiagnosticMessage {
            code: diagnostic_codes::$name,
            category: DiagnosticCategory::Error,
            message: diagnostic_messages::$name,
        }),*]
    };
}

pub static DIAGNOSTIC_MESSAGES: &[DiagnosticMessage] = messages![
    NO_SUCH_MEMBER,
    BAD_SYMBOL_KIND,
    AMBIGUOUS_CALL,
    BAD_ACCESS,
    PROPERTY_LACKS_GET,
    OBJECT_PROHIBITED,
    CANT_INFER_METHOD_TYPE_ARGS,
    CIRCULAR_CONSTRAINT,
    INTERFACE_IMPLEMENTED_BY_CONDITIONAL,
    BAD_INSTANCE_ARG_TYPE,
    NON_INVOCABLE_MEMBER_CALLED,
    NO_SUCH_MEMBER_OR_EXTENSION,
    BAD_AWAIT_ARG,
    BAD_AWAIT_ARG_INTRINSIC,
    BAD_AWAIT_ARG_VOID_CALL,
    BAD_AWAITER_PATTERN,
    DOES_NOT_IMPLEMENT_AWAIT_INTERFACE,
    NO_CORRESPONDING_ARGUMENT,
];
