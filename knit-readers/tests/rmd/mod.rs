// R Markdown reader tests
//
// Every test in here that reads an .Rmd changes the process working directory
// through the reader, so each one holds `common::serial()` for its whole body.

mod cleanup;
