mod common;
mod countdown;
