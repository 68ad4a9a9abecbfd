use std::io::Write;

use crate::batch_processor::ProcessedRow;

pub const COMMISSION_FEE_COLUMN: &str = "Commission Fee";

/// Writes the output statement: the original header plus the appended fee
/// column, then every input row with its fee (or the invalid-data sentinel).
pub fn write_report<W: Write>(
    header: &[String],
    rows: &[ProcessedRow],
    writer: W,
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut out_header: Vec<&str> = header.iter().map(String::as_str).collect();
    out_header.push(COMMISSION_FEE_COLUMN);
    csv_writer.write_record(&out_header)?;

    for processed in rows {
        let mut record: Vec<&str> = processed.row.columns().to_vec();
        record.push(&processed.commission);
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}
