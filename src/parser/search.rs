use nom::{
    IResult,
    bytes::complete::tag_no_case,
    character::complete::{space0, space1, u32},
    combinator::{all_consuming, opt},
    multi::separated_list0,
    sequence::{delimited, terminated},
};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("malformed SEARCH response {line:?}")]
pub struct MalformedSearchResponse {
    line: String,
}

fn search_result(input: &str) -> IResult<&str, Vec<u32>> {
    all_consuming(delimited(
        terminated(opt(tag_no_case("SEARCH")), space0),
        separated_list0(space1, u32),
        space0,
    ))(input)
}

/// Message sequence numbers listed by the untagged `SEARCH` lines.
pub fn parse_search<S: AsRef<str>>(lines: &[S]) -> Result<Vec<u32>, MalformedSearchResponse> {
    let mut numbers = Vec::new();
    for line in lines {
        let line = line.as_ref();
        let (_, found) = search_result(line).map_err(|_| MalformedSearchResponse {
            line: line.to_string(),
        })?;
        numbers.extend(found);
    }

    Ok(numbers)
}

#[cfg(test)]
mod tests {
    use assertables::*;
    use rstest::*;

    use super::*;

    #[rstest]
    #[case(&["1 5 9"], vec![1, 5, 9])]
    #[case(&["SEARCH 2 3"], vec![2, 3])]
    #[case(&[""], vec![])]
    #[case(&[], vec![])]
    #[case(&["4", "7 8 "], vec![4, 7, 8])]
    fn test_parse_search_collects_numbers(#[case] lines: &[&str], #[case] expected: Vec<u32>) {
        assert_eq!(expected, assert_ok!(parse_search(lines)));
    }

    #[rstest]
    #[case("1 two 3")]
    #[case("1,2")]
    fn test_parse_search_rejects_garbage(#[case] line: &str) {
        assert_eq!(
            MalformedSearchResponse {
                line: line.to_string()
            },
            assert_err!(parse_search(&[line]))
        );
    }
}
