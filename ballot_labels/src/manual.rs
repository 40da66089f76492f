/*!

This is the long-form manual for `ballot_labels` and `votescan`.

## Input formats

The following formats are supported:
* `xlsx` Excel spreadsheet (default)
* `csv` Comma Separated Values with a header row

In both cases, the first used row is the header. The entries are read from the column whose
header matches the `--column` flag (`text` by default). Empty cells are skipped. Numbers
and booleans are turned into text before labeling. Dates are written as
`YYYY-MM-DD HH:MM:SS`. Cells holding an Excel error such as `#N/A` keep the error as
their text: they usually end up with the fallback label.

### `xlsx`

When the workbook contains several worksheets, the first one is used unless
`--excel-worksheet-name` is provided.

### `csv`

The file must be encoded in UTF-8.

## Labeling

Each entry is lower-cased and compared with an ordered list of rules. A rule has a
label, a list of keywords and a colour for the chart. The first rule for which one
of the keywords appears as a *whole word* gives its label to the entry:

| text                  | label        |
|-----------------------|--------------|
| `Voto por NOBOA`      | `Voto Noboa` |
| `luisa gonzález`      | `Voto Luisa` |
| `noboa o luisa`       | `Voto Luisa` |
| `noboaaa`             | `Voto Nulo`  |

When no rule matches, the fallback label is used (`Voto Nulo` by default).
Keywords are matched literally: characters such as `.` or `*` have no special meaning.

## Sampling

The statistics are computed on a random sample of the entries. By default the sample
contains 5000 entries (or the whole dataset if it is smaller) and is drawn with the
seed 42. The same input, size and seed always produce the same sample.

## Configuration

`votescan` comes with sensible defaults but users may want to change the labels or
the chat model. The program accepts a configuration file in JSON:

```json
{
  "input": { "provider": "xlsx", "filePath": "votes.xlsx", "column": "text" },
  "sampling": { "sampleSize": 2000, "seed": 42 },
  "labels": {
    "rules": [
      { "label": "Voto Luisa", "keywords": ["luisa", "gonzález"], "color": "red" },
      { "label": "Voto Noboa", "keywords": ["noboa"], "color": "blue" }
    ],
    "fallback": { "label": "Voto Nulo", "color": "gray" }
  },
  "chat": { "model": "llama-3.3-70b-specdec", "apiKeyEnv": "GROQ_API_KEY", "language": "Spanish" },
  "output": { "chartPath": "chart.png", "summaryPath": "summary.json" }
}
```

All the sections are optional. Relative paths are resolved from the directory of the
configuration file. Flags passed on the command line take precedence over the file.

Supported colours: `blue`, `red`, `gray`, `green`, `orange`, `purple`, `black`, `yellow`.
Any other name is drawn in gray.

## Questions

With `--question` (or `--interactive`), a summary of the sample is sent with the
question to a chat-completion service compatible with the OpenAI API. The answer is
printed as it arrives. Only the counts are sent, never the entries themselves.

The API key is read from the environment variable named by `apiKeyEnv`. A `.env` file
in the current directory is loaded first.

 */
