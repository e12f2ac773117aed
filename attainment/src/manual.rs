/*!

This is the long-form manual for `attainment` and `quotaboard`.

## Input files

Two spreadsheets are consumed, in `.xlsx` or `.csv` form:

### Case export

The export of the case-management tool. Four columns are required, with
these exact headers:

* `Data/hora conclusão efetiva` — completion timestamp. Parsed
  permissively (day-first and ISO forms); values that do not parse are
  kept as empty rather than failing the import.
* `Status` — only rows whose status is `Cumprido` (in any casing) are
  counted.
* `Subtipo` — when any of the four default case subtypes is present in
  the data, only those subtypes are counted; when none is present the
  subtype filter is skipped entirely.
* `Escritório responsável` — the raw office, e.g. `FIRM / BRANCH`. The
  part after the last ` / ` is used as the display name; the full value
  is the join key against the quota sheet.

If any required column is missing, the import fails and the error names
every missing column.

### Quota sheet

Two columns, located by case-insensitive header matching:

* an office column matching `Escritório responsável`;
* a quota column matching any of `quota`, `meta`, `meta_pastas_abertas`
  or `meta pastas abertas`.

Quota cells that are empty or not numeric count as zero. If the same
office appears on several rows, the last row wins.

Running `quotaboard --template quotas.csv` writes a ready-to-fill sheet
with the expected headers.

## Report

Each office present in the filtered case data gets one row: case count,
quota, attainment percentage (undefined when no quota is set — such rows
rank after every scored office), a band (`BELOW` under 70%, `NEAR` from
70% to 99%, `MET` at 100% or more, `NO_QUOTA` otherwise) and a bar width
capped at 160% of the quota for rendering.

*/
