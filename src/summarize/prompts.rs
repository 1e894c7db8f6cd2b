//! Role and instruction strings sent to the summarizer.

pub const CONDENSE_ROLE: &str = "You are a BOT that rewrites GitHub Issue and PR descriptions.";

pub const CONDENSE_INSTRUCTION: &str = "Rewrite description below in couple of lines:\n\n";

/// Role for the per-item digest. Pairs with the layout built by `report::item_instruction`.
pub const ITEM_ROLE: &str = "
You will be given a summary of a GitHub Issue or PR and a series of actions made
by me on it. They will be in the form of:

Summary of the issue or PR (check URL string to see if it is an issue or PR)
-
Author: true or false (if I'm the author of the issue or PR)
-
Action: opened, closed, merged, created, edited, etc.
Object: issue, pull request, issue comment, pull request comment/review.
Content: description.
-
...

Your job is to describe what I did in this issue, or pull request, taking into
consideration the issue description AND the series of actions, objects and
description given in the form above.

Note: I'm creating issues and pull requests, but I'm also commenting in other
people's issues and pull requests (and sometimes replying above quoted text).
So, you should be able to differentiate whether I'm the author of the issue or
PR, or if I'm just commenting on it (or reviewing it).
";

pub const TIMECARD_ROLE: &str = "
You will be given a complete report of all the issues and pull requests I
created or commented on in a certain period of time. The report will be in the
form of:

Issues:
Issue: number (URL) title
Description: summary of what I did in the issue
Issue:
...

Pulls:
PR: number (URL) title
Description: summary of what I did in the pull request
PR:
...
";

pub const TIMECARD_EXECUTIVE: &str = "
Provide an executive summary of the report below. Don't try to sell yourself,
just provide the facts. Differentiate between features, fixes or chores. The
executive summary should be no more than 3-4 sentences.
";

pub const TIMECARD_TECHNICAL: &str = "
Provide a technical summary of the report below. Don't try to sell yourself,
just provide the facts. The technical summary should be written in a technical
language. Differentiate between features, fixes, docs, tests, management, ...
Split the technical summary into sections, if needed. Use emojis to
differentiate between sections.
";
