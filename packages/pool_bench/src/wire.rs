// Line protocol spoken between the coordinator and its worker processes.
//
// Request:  "<index> <n>\n"
// Response: "<index> <sum>\n"
//
// The index lets the coordinator verify which request a response answers.

use std::str::FromStr;

use crate::{Error, Result};

/// One unit of work sent to a worker process.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Request {
    pub(crate) index: usize,
    pub(crate) n: u64,
}

/// The answer to one [`Request`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Response {
    pub(crate) index: usize,
    pub(crate) sum: u128,
}

pub(crate) fn encode_request(request: Request) -> String {
    format!("{} {}\n", request.index, request.n)
}

pub(crate) fn decode_request(line: &str) -> Result<Request> {
    let (index, n) = split_pair(line)?;

    Ok(Request { index, n })
}

pub(crate) fn encode_response(response: Response) -> String {
    format!("{} {}\n", response.index, response.sum)
}

pub(crate) fn decode_response(line: &str) -> Result<Response> {
    let (index, sum) = split_pair(line)?;

    Ok(Response { index, sum })
}

fn split_pair<A: FromStr, B: FromStr>(line: &str) -> Result<(A, B)> {
    let trimmed = line.trim_end_matches(['\r', '\n']);

    let protocol_error = || Error::Protocol {
        line: trimmed.to_string(),
    };

    let (first, second) = trimmed.split_once(' ').ok_or_else(protocol_error)?;

    let first = first.parse().ok().ok_or_else(protocol_error)?;
    let second = second.parse().ok().ok_or_else(protocol_error)?;

    Ok((first, second))
}
