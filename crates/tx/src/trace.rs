//! Provenance trails for tracked outputs.
//!
//! A [`Trace`] records how a tracked output came to exist: an origin category plus a growable
//! call/via history. Traces are immutable — derivation returns a new value — and are used for
//! diagnostics only, never for equality or routing decisions.

use std::fmt;

const CALLED_FROM: &str = "\nCALLED FROM: ";
const VIA: &str = "\n   <~-  VIA: ";

/// How a tracked output originally entered the bookkeeping layer.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TraceSource {
    /// Produced by a previous transaction in an unsubmitted chain.
    ChainReplay,
    /// Pushed over a socket connection.
    Socket,
    /// Loaded during initial wallet enumeration.
    InitialLoad,
    /// Delivered by a standing subscription.
    SubscriptionUpdate,
    /// Handed in directly by the caller.
    CallerInput,
    /// Derived automatically by this layer.
    Auto,
}

impl TraceSource {
    /// The fixed token this source renders as. Tokens are right-padded to width 8 when
    /// composed, purely for human alignment.
    pub fn token(self) -> &'static str {
        match self {
            TraceSource::ChainReplay => "CHAIN",
            TraceSource::Socket => "SOCKET",
            TraceSource::InitialLoad => "INIT",
            TraceSource::SubscriptionUpdate => "SUB",
            TraceSource::CallerInput => "INPUT",
            TraceSource::Auto => "AUTO",
        }
    }
}

/// An immutable, composable provenance trail.
#[derive(Clone, Debug)]
pub struct Trace {
    trace: String,
    prefix: String,
}

impl Trace {
    /// Construct a root trace from an origin category and a description of the originator.
    pub fn source(source: TraceSource, from: &str) -> Trace {
        let token = source.token();
        Trace {
            trace: format!("{token}: {from}\n"),
            prefix: format!("\n{}BY ", " ".repeat(8 - token.len())),
        }
    }

    /// The full trail, prefixed for chaining onto an outer trail.
    pub fn compose(&self) -> String {
        format!("{}{}", self.prefix, self.trace)
    }

    /// Derive a trace recording a named call arriving from a described origin.
    pub fn called_from(&self, name: &str, from: &str) -> Trace {
        Trace {
            trace: format!("{name}{CALLED_FROM}{from}{}", self.compose()),
            prefix: CALLED_FROM.to_owned(),
        }
    }

    /// Derive a trace recording that the value passed through an intermediate step.
    pub fn via(&self, text: &str) -> Trace {
        Trace {
            trace: format!("{text}{}", self.compose()),
            prefix: VIA.to_owned(),
        }
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.trace)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn it_composes_root_traces() {
        let trace = Trace::source(TraceSource::InitialLoad, "wallet enumeration");
        assert_eq!(trace.to_string(), "INIT: wallet enumeration\n");
        assert_eq!(trace.compose(), "\n    BY INIT: wallet enumeration\n");
    }

    #[test]
    fn it_pads_tokens_to_a_fixed_width() {
        // SOCKET is the widest token; its BY lands at the same column as INIT's
        let socket = Trace::source(TraceSource::Socket, "x");
        let init = Trace::source(TraceSource::InitialLoad, "x");
        let token_end_col = |s: &str, token: &str| s.find("BY ").unwrap() + "BY ".len() + token.len();
        assert_eq!(
            token_end_col(&socket.compose(), "SOCKET"),
            token_end_col(&init.compose(), "INIT")
        );
        assert_eq!(socket.compose(), "\n  BY SOCKET: x\n");
    }

    #[test]
    fn it_derives_without_mutating_the_original() {
        let root = Trace::source(TraceSource::CallerInput, "caller");
        let derived = root.via("supply");
        assert_eq!(root.to_string(), "INPUT: caller\n");
        assert_eq!(derived.to_string(), "supply\n   BY INPUT: caller\n");

        let called = derived.called_from("insert", "sequencer");
        assert_eq!(
            called.to_string(),
            "insert\nCALLED FROM: sequencer\n   <~-  VIA: supply\n   BY INPUT: caller\n"
        );
    }
}
