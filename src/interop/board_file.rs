use crate::model::BoardParseError;

/// Parses the board-file format (§6):
///
/// ```text
/// <rows>x<columns>
/// <card-label>
/// <card-label>
/// ...
/// ```
///
/// Blank lines are skipped; exactly `rows * columns` non-blank label lines
/// must follow the dimension line. Returns the triple a
/// [`crate::engine::Board::new`] caller needs.
pub fn parse_board_file(contents: &str) -> Result<(usize, usize, Vec<String>), BoardParseError> {
    let mut lines = contents.lines().filter(|line| !line.trim().is_empty());

    let dimensions_line = lines.next().ok_or(BoardParseError::Empty)?;
    let (rows, columns) = parse_dimensions(dimensions_line)?;

    let labels: Vec<String> = lines.map(str::to_string).collect();
    let expected = rows.saturating_mul(columns);
    if labels.len() != expected {
        return Err(BoardParseError::LabelCountMismatch {
            expected,
            found: labels.len(),
        });
    }

    Ok((rows, columns, labels))
}

fn parse_dimensions(line: &str) -> Result<(usize, usize), BoardParseError> {
    let malformed = || BoardParseError::MalformedDimensions(line.to_string());
    let (rows_str, columns_str) = line.trim().split_once('x').ok_or_else(malformed)?;
    let rows = rows_str.parse().map_err(|_| malformed())?;
    let columns = columns_str.parse().map_err(|_| malformed())?;
    Ok((rows, columns))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_a_well_formed_board() {
        let (rows, columns, labels) = parse_board_file("2x2\nA\nA\nB\nB\n").unwrap();
        assert_eq!(rows, 2);
        assert_eq!(columns, 2);
        assert_eq!(labels, vec!["A", "A", "B", "B"]);
    }

    #[test]
    fn skips_blank_lines() {
        let (rows, columns, labels) = parse_board_file("1x2\n\nA\n\nB\n\n").unwrap();
        assert_eq!((rows, columns), (1, 2));
        assert_eq!(labels, vec!["A", "B"]);
    }

    #[test]
    fn empty_file_is_rejected() {
        assert_eq!(parse_board_file(""), Err(BoardParseError::Empty));
        assert_eq!(parse_board_file("\n\n   \n"), Err(BoardParseError::Empty));
    }

    #[test]
    fn malformed_dimension_line_is_rejected() {
        let err = parse_board_file("not-a-dimension\nA\n").unwrap_err();
        assert_eq!(err, BoardParseError::MalformedDimensions("not-a-dimension".to_string()));
    }

    #[test]
    fn wrong_label_count_is_rejected() {
        let err = parse_board_file("2x2\nA\nB\n").unwrap_err();
        assert_eq!(err, BoardParseError::LabelCountMismatch { expected: 4, found: 2 });
    }
}
