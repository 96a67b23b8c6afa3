// SPDX-FileCopyrightText: 2025 Phoenix R&D GmbH <hello@phnx.im>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::fmt;

tonic::include_proto!("exception.v1");

const UNKNOWN_EXCEPTION: &str = "<unknown exception>";

impl ExceptionDetail {
    pub fn message(&self) -> &str {
        self.summary
            .as_ref()
            .map(|summary| summary.message.as_str())
            .unwrap_or_default()
    }

    pub fn class_name(&self) -> &str {
        self.summary
            .as_ref()
            .and_then(|summary| summary.class_type.as_ref())
            .map(|class_type| class_type.class_name.as_str())
            .unwrap_or_default()
    }

    pub fn error_id(&self) -> Option<&ErrorId> {
        self.summary.as_ref()?.error_id.as_ref()
    }

    pub fn stack_trace(&self) -> &[StackTraceElement] {
        self.summary
            .as_ref()
            .and_then(|summary| summary.stack_trace.as_ref())
            .map(|stack_trace| stack_trace.element.as_slice())
            .unwrap_or_default()
    }

    /// Iterates over the cause chain, starting with this exception.
    pub fn causes(&self) -> impl Iterator<Item = &ExceptionDetail> {
        std::iter::successors(Some(self), |detail| detail.cause.as_deref())
    }

    /// The innermost cause, or this exception if it has no cause.
    pub fn root_cause(&self) -> &ExceptionDetail {
        self.causes().last().unwrap_or(self)
    }

    fn write_trace(&self, f: &mut fmt::Formatter<'_>, caption: &str, indent: &str) -> fmt::Result {
        match &self.summary {
            Some(summary) => writeln!(f, "{indent}{caption}{summary}")?,
            None => writeln!(f, "{indent}{caption}{UNKNOWN_EXCEPTION}")?,
        }
        for element in self.stack_trace() {
            writeln!(f, "{indent}\tat {element}")?;
        }
        let nested_indent = format!("{indent}\t");
        for suppressed in &self.suppressed {
            suppressed.write_trace(f, "Suppressed: ", &nested_indent)?;
        }
        if let Some(cause) = &self.cause {
            cause.write_trace(f, "Caused by: ", indent)?;
        }
        Ok(())
    }
}

/// Renders the complete stack trace, including suppressed exceptions and causes.
impl fmt::Display for ExceptionDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_trace(f, "", "")
    }
}

/// Renders the header line of a stack trace: `<class name>: <message>`.
impl fmt::Display for ExceptionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let class_name = self
            .class_type
            .as_ref()
            .map(|class_type| class_type.class_name.as_str())
            .unwrap_or_default();
        match (class_name.is_empty(), self.message.is_empty()) {
            (true, true) => f.write_str(UNKNOWN_EXCEPTION),
            (true, false) => f.write_str(&self.message),
            (false, true) => f.write_str(class_name),
            (false, false) => write!(f, "{class_name}: {}", self.message),
        }
    }
}

impl fmt::Display for StackTraceElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.class_name, self.method_name)?;
        if self.file_name.is_empty() {
            f.write_str("Unknown Source")?;
        } else if self.line_number >= 0 {
            write!(f, "{}:{}", self.file_name, self.line_number)?;
        } else {
            f.write_str(&self.file_name)?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for ErrorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.code)
    }
}
