//! Textual request/response protocol of the likelihood oracle.
//!
//! Purpose
//! -------
//! Encode a simulation request into the fixed-field record format the
//! coalescent simulator consumes, and decode its single-line response.
//!
//! Conventions
//! -----------
//! - Request values are left-padded to 20 columns and followed by a field
//!   label; the labels are documentation only. Consumers read fields
//!   positionally as whitespace-separated tokens, never by column width.
//! - The response is one line of four numbers: omega, sigma, npop, and the
//!   achieved likelihood for the criterion selected in the request. When
//!   several lines appear, the last one wins.
//! - A response with non-positive npop or likelihood means the oracle did
//!   not produce a usable result; that is an outcome, not a transport error.

use crate::binning::Binning;
use crate::params::ParameterSet;
use crate::simulation::errors::{SimResult, SimulationError};

use std::fmt::Write as _;

/// One fully specified oracle invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRequest<'a> {
    /// The observed binning curve the simulation is scored against.
    pub binning: &'a Binning,
    /// Candidate ecotype-formation rate.
    pub omega: f64,
    /// Candidate periodic-selection rate.
    pub sigma: f64,
    /// Candidate ecotype count.
    pub npop: i64,
    /// Population sample size (number of environmental sequences).
    pub nu: u32,
    /// Stochastic replicate count.
    pub nrep: u32,
    /// Random number seed; odd and below nine digits.
    pub seed: u64,
    /// Sequence length after gap removal.
    pub length: u32,
    /// Which success-rate statistic the oracle reports back.
    pub criterion: u32,
}

impl SimulationRequest<'_> {
    /// Render the request in the oracle's record format.
    pub fn render(&self) -> String {
        let mut out = String::new();
        // Infallible: writing to a String cannot fail.
        let _ = writeln!(out, "{:<20} numcrit", self.binning.len());
        for bin in self.binning.bins() {
            let _ = writeln!(out, "{:<20.6} {:<20}", bin.crit(), bin.level());
        }
        let _ = writeln!(out, "{:<20.5} omega", self.omega);
        let _ = writeln!(out, "{:<20.5} sigma", self.sigma);
        let _ = writeln!(out, "{:<20} npop", self.npop);
        let _ = writeln!(out, "{:<20} nu", self.nu);
        let _ = writeln!(out, "{:<20} nrep", self.nrep);
        let _ = writeln!(out, "{:<20} iii (random number seed)", self.seed);
        let _ = writeln!(out, "{:<20} lengthseq (after deleting gaps, etc.)", self.length);
        let _ = writeln!(out, "{:<20} whichavg", self.criterion);
        out
    }
}

/// The oracle's answer: the evaluated parameters and their likelihood.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReply {
    pub omega: f64,
    pub sigma: f64,
    pub npop: i64,
    pub likelihood: f64,
}

impl SimulationReply {
    /// Parse the response text.
    ///
    /// Each non-empty line is read positionally; the last parsable line is
    /// the result.
    ///
    /// # Errors
    /// - [`SimulationError::MissingReply`] if no non-empty line exists.
    /// - [`SimulationError::MalformedReply`] if a line has fewer than four
    ///   tokens or a token fails to parse.
    pub fn parse(text: &str) -> SimResult<Self> {
        let mut reply = None;
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            reply = Some(Self::parse_line(line)?);
        }
        reply.ok_or(SimulationError::MissingReply)
    }

    fn parse_line(line: &str) -> SimResult<Self> {
        let mut tokens = line.split_whitespace();
        let omega =
            parse_field(next_token(&mut tokens, line, "missing omega")?, line, "omega is not a number")?;
        let sigma =
            parse_field(next_token(&mut tokens, line, "missing sigma")?, line, "sigma is not a number")?;
        let npop: i64 = next_token(&mut tokens, line, "missing npop")?
            .parse()
            .map_err(|_| SimulationError::MalformedReply {
                line: line.to_string(),
                reason: "npop is not an integer",
            })?;
        let likelihood = parse_field(
            next_token(&mut tokens, line, "missing likelihood")?,
            line,
            "likelihood is not a number",
        )?;
        Ok(Self { omega, sigma, npop, likelihood })
    }

    /// Whether the oracle produced a usable result.
    pub fn is_usable(&self) -> bool {
        self.npop > 0 && self.likelihood > 0.0
    }

    /// Convert into a [`ParameterSet`], or `None` for an unusable reply.
    pub fn into_result(self) -> Option<ParameterSet> {
        if self.is_usable() {
            Some(ParameterSet::new(self.omega, self.sigma, self.npop, self.likelihood))
        } else {
            None
        }
    }
}

fn next_token<'a>(
    tokens: &mut std::str::SplitWhitespace<'a>,
    line: &str,
    reason: &'static str,
) -> SimResult<&'a str> {
    tokens
        .next()
        .ok_or_else(|| SimulationError::MalformedReply { line: line.to_string(), reason })
}

fn parse_field(token: &str, line: &str, reason: &'static str) -> SimResult<f64> {
    token
        .parse()
        .map_err(|_| SimulationError::MalformedReply { line: line.to_string(), reason })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binning::{BinLevel, Binning};

    fn binning() -> Binning {
        Binning::new(vec![
            BinLevel::new(1.0, 12).unwrap(),
            BinLevel::new(0.95, 5).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn request_fields_appear_in_order() {
        let binning = binning();
        let request = SimulationRequest {
            binning: &binning,
            omega: 0.5,
            sigma: 1.25,
            npop: 4,
            nu: 30,
            nrep: 10_000,
            seed: 1_234_567,
            length: 1000,
            criterion: 1,
        };
        let text = request.render();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 1 + binning.len() + 8);
        assert!(lines[0].starts_with("2 "));
        assert!(lines[0].ends_with("numcrit"));
        assert!(lines[1].starts_with("1.000000"));
        assert!(lines[2].starts_with("0.950000"));
        assert!(lines[3].starts_with("0.50000") && lines[3].ends_with("omega"));
        assert!(lines[4].starts_with("1.25000") && lines[4].ends_with("sigma"));
        assert!(lines[5].starts_with("4 ") && lines[5].ends_with("npop"));
        assert!(lines[6].starts_with("30 ") && lines[6].ends_with("nu"));
        assert!(lines[7].starts_with("10000 ") && lines[7].ends_with("nrep"));
        assert!(lines[8].starts_with("1234567 "));
        assert!(lines[9].starts_with("1000 "));
        assert!(lines[10].starts_with("1 ") && lines[10].ends_with("whichavg"));
    }

    #[test]
    fn reply_parses_positionally() {
        let reply = SimulationReply::parse("0.5      1.25     4        0.82\n").unwrap();
        assert_eq!(reply.omega, 0.5);
        assert_eq!(reply.sigma, 1.25);
        assert_eq!(reply.npop, 4);
        assert_eq!(reply.likelihood, 0.82);
        assert!(reply.is_usable());
    }

    #[test]
    fn last_reply_line_wins() {
        let text = "0.1 0.2 1 0.10\n0.5 1.25 4 0.82\n";
        let reply = SimulationReply::parse(text).unwrap();
        assert_eq!(reply.likelihood, 0.82);
    }

    #[test]
    fn non_positive_npop_is_unusable() {
        let reply = SimulationReply::parse("0.5 1.25 0 0.82").unwrap();
        assert!(!reply.is_usable());
        assert_eq!(reply.into_result(), None);
    }

    #[test]
    fn non_positive_likelihood_is_unusable() {
        let reply = SimulationReply::parse("0.5 1.25 4 0.0").unwrap();
        assert_eq!(reply.into_result(), None);
    }

    #[test]
    fn empty_response_is_missing() {
        assert_eq!(SimulationReply::parse("\n  \n"), Err(SimulationError::MissingReply));
    }

    #[test]
    fn short_line_is_malformed() {
        assert!(matches!(
            SimulationReply::parse("0.5 1.25 4"),
            Err(SimulationError::MalformedReply { .. })
        ));
    }
}
