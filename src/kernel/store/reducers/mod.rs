mod documents;
mod explorer;
mod session;
