/*!

This is the long-form manual for `party_line` and `partyline`.

## Vote values

The vocabulary is closed:
* affirmative: `Yea`, `Aye`
* negative: `Nay`, `No`
* non-substantive: `Present`, `Not Voting`

Any other string found in the records is reported as an error
(`AmbiguousVocabulary`). It is never dropped or counted as a new value.

## Roll call ids

A roll call is identified by `year * 1000 + roll_number`, for example
`2023017` for the 17th roll call of 2023. The roll call number must be
between 1 and 999 and the year must have four digits.

## Party majority

For each roll call and each party, the majority is the value cast by the
largest number of members of the party. All the values are counted,
including `Present` and `Not Voting`.

When several values share the largest count, the tie-break mode decides:

* `vocabularyOrder` (default): affirmative, then negative, then
  non-substantive. Within a group, the recorded strings are compared
  (`Aye` before `Yea`, `Nay` before `No`, `Not Voting` before `Present`).
* `lexicographic`: the recorded strings are compared.
* `reject`: the roll call fails with a `TieBreakAmbiguity` error naming the
  tied values.

A party with a single member on a roll call (for example an independent) is
its own majority and never dissents.

## Dissenters

A dissenter is a legislator whose vote differs from the majority of their
party. With `--include-non-votes`, `Present` and `Not Voting` against the
majority are also reported; without it, they never are.

The records are sorted by party, vote, last name and first name, and expose
the fields `roll_id, party, vote, name, state, district, phone, party_vote`.

## Multi-roll operations

`tallies` and `all-dissenters` read each roll call independently, with up to
`workers` roll calls read at the same time. A roll call that is missing or
unreadable does not stop the others: it is listed separately in the output
under `failures`. The rows are always in roll call order.

## State pivot

`pivot --state XX` counts, for every legislator of the state, how many times
they cast each of the six values over all the roll calls on record. The
table has one row per legislator (even those without any vote) and one
column per value. The row label contains the party, e.g.
`Bernard Sanders (I, caucuses D)`.

## SQLite input

The database is opened read-only. Expected tables:

```text
reps(rep_id TEXT, first_name TEXT, last_name TEXT, party TEXT,
     party_designation TEXT, state TEXT, district TEXT, phone TEXT)
rolls(roll_id INTEGER, roll_call INTEGER, question TEXT, date TEXT, result TEXT)
votes(roll_id INTEGER, rep_id TEXT, vote TEXT)
```

`rep_id` and `district` may also be stored as integers. The `roll_call`
column is not read: the roll call number is part of `roll_id`. A vote whose
`rep_id` has no row in `reps` is reported as `LegislatorNotFound`.

A database locked by a writer for longer than `busyTimeoutMs` fails with
`StoreUnavailable` instead of blocking.

## CSV input

With `--csv-dir DIR`, the same three tables are read from `DIR/reps.csv`,
`DIR/rolls.csv` and `DIR/votes.csv`, each with a header row naming the
columns above.

## Configuration file

```json
{
  "database": { "path": "congress_roll_calls.db", "busyTimeoutMs": 5000 },
  "rules": {
    "tiebreakMode": "vocabularyOrder",
    "includeNonSubstantive": false,
    "workers": 4
  },
  "session": { "year": 2023 }
}
```

Command line flags take precedence over the configuration file.

*/
