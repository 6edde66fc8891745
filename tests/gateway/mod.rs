//! WebSocket gateway tests over in-process channels

mod session_tests;
