//! UTF-8 CSV with a byte-order mark, so spreadsheet applications detect
//! the encoding and show Arabic text instead of mojibake.

/// EF BB BF.
pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// BOM followed by `lines` joined with `\n`. Lines are taken as already
/// formatted CSV.
pub fn csv_utf8_blob<S: AsRef<str>>(lines: &[S]) -> Vec<u8> {
    let body_len: usize = lines.iter().map(|l| l.as_ref().len() + 1).sum();
    let mut out = Vec::with_capacity(UTF8_BOM.len() + body_len);
    out.extend_from_slice(&UTF8_BOM);
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push(b'\n');
        }
        out.extend_from_slice(line.as_ref().as_bytes());
    }
    out
}

/// BOM followed by `rows` written through the `csv` crate (quoting and
/// escaping handled), one record per line.
pub fn csv_utf8_records<I, R, F>(rows: I) -> Result<Vec<u8>, csv::Error>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = F>,
    F: AsRef<[u8]>,
{
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .flexible(true)
        .from_writer(UTF8_BOM.to_vec());
    for row in rows {
        wtr.write_record(row)?;
    }
    wtr.into_inner().map_err(|e| e.into_error().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_starts_with_bom() {
        let blob = csv_utf8_blob(&["a", "b"]);
        assert_eq!(blob, b"\xEF\xBB\xBFa\nb");
    }

    #[test]
    fn empty_blob_is_just_bom() {
        let lines: [&str; 0] = [];
        assert_eq!(csv_utf8_blob(&lines), UTF8_BOM);
    }

    #[test]
    fn records_are_quoted() {
        let rows = vec![vec!["الاسم", "المبلغ"], vec!["شركة, مصر", "100.00"]];
        let out = csv_utf8_records(rows).unwrap();
        let text = std::str::from_utf8(&out[3..]).unwrap();
        assert_eq!(&out[..3], UTF8_BOM);
        assert_eq!(text, "الاسم,المبلغ\n\"شركة, مصر\",100.00\n");
    }
}
