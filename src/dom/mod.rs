pub mod dispatcher;
pub mod draggable;
pub mod region_view;
pub mod scheduler;
