pub mod dispatch_finder;
